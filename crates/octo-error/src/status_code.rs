//! Status codes for error classification.
//!
//! Format: XX_YYY. XX selects a category, YYY is the code within it.

/// Metadata attached to every status code.
#[derive(Debug, Clone, Copy)]
pub struct StatusMeta {
    pub retryable: bool,
    pub category: StatusCategory,
}

/// Coarse category a status code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Common,
    Input,
    Io,
    Network,
    Provider,
    Tool,
}

macro_rules! define_status_codes {
    ($(
        $name:ident = $value:expr => { retryable: $retry:expr, category: $cat:ident }
    ),* $(,)?) => {
        /// Status codes for error classification across the core.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(i32)]
        pub enum StatusCode {
            $($name = $value,)*
        }

        impl StatusCode {
            pub const fn meta(&self) -> StatusMeta {
                match self {
                    $(Self::$name => StatusMeta { retryable: $retry, category: StatusCategory::$cat },)*
                }
            }
        }
    };
}

define_status_codes! {
    Internal          = 1000 => { retryable: false, category: Common },
    InvalidArguments  = 2000 => { retryable: false, category: Input },
    NotFound          = 2001 => { retryable: false, category: Input },
    FileOutdated      = 2002 => { retryable: true,  category: Io },
    FileExists        = 2003 => { retryable: false, category: Io },
    FileUnreadable    = 2004 => { retryable: false, category: Io },
    IoError           = 3000 => { retryable: true,  category: Io },
    NetworkError      = 4000 => { retryable: true,  category: Network },
    RateLimited       = 4001 => { retryable: true,  category: Network },
    Cancelled         = 4002 => { retryable: false, category: Network },
    ProviderError     = 5000 => { retryable: true,  category: Provider },
    ToolExecution     = 6000 => { retryable: false, category: Tool },
    PermissionDenied  = 6001 => { retryable: false, category: Tool },
}
