//! Octo's entry point: wires a local [`transport::LocalTransport`], the
//! built-in tool registry, a provider completion client, and the agent
//! loop into a runnable REPL. Everything this binary owns (config loading,
//! terminal I/O, confirmation prompts) is explicitly out of the core's
//! scope (§1) — the core only consumes the traits this file implements.

mod completion;
mod config;
mod curl;
mod small_model;
mod system_prompt;
mod transport;

use std::io::Write as _;
use std::sync::Arc;

use clap::Parser;
use octo_context::ContextSpace;
use octo_history::History;
use octo_loop::DiffAutofixer;
use octo_loop::JsonAutofixer;
use octo_loop::Summarizer;
use octo_protocol::HistoryItem;
use octo_protocol::Mode;
use octo_protocol::Transport as _;
use octo_providers::AnthropicCompiler;
use octo_providers::OpenAiCompiler;
use octo_tools::ToolContext;
use octo_tools::ToolRegistry;
use octo_tools::builtin;
use octo_tracker::FileTracker;
use tokio_util::sync::CancellationToken;

use config::Args;
use config::Provider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "octo=info".into()))
        .init();

    let workspace = args.workspace.canonicalize().unwrap_or_else(|_| args.workspace.clone());
    let mode: Mode = args.mode.into();
    let plan_file_path = match mode {
        Mode::Plan => Some(
            args.plan_file
                .clone()
                .unwrap_or_else(|| workspace.join("PLAN.md"))
                .to_string_lossy()
                .into_owned(),
        ),
        _ => None,
    };

    let api_key = args.api_key()?;
    let http = reqwest::Client::new();
    let registry = build_registry();

    let local_transport = Arc::new(transport::LocalTransport::new(workspace.clone()));
    let tool_ctx = ToolContext {
        transport: local_transport.clone(),
        tracker: Arc::new(FileTracker::new()),
        mode,
        mcp_clients: std::collections::HashMap::new(),
        plan_file_path: plan_file_path.clone(),
        context_window_tokens: args.context_window_tokens,
        web_search_client: None,
        task_runner: None,
        skills_dir: Some(workspace.join(".octo/skills")),
        abort: CancellationToken::new(),
    };

    let cwd_entries: Vec<String> = local_transport
        .readdir(&CancellationToken::new(), &workspace)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|e| e.name)
        .collect();

    let (json_autofixer, diff_autofixer, summarizer): (
        Box<dyn JsonAutofixer>,
        Box<dyn DiffAutofixer>,
        Box<dyn Summarizer>,
    ) = match args.provider {
        Provider::Openai => {
            let small_client = completion::OpenAiClient {
                http: http.clone(),
                base_url: args.base_url(),
                api_key: api_key.clone(),
                model: args.small_model(),
            };
            build_small_model_helpers(small_client, small_model::WireFormat::OpenAi, args.context_window_tokens)
        }
        Provider::Anthropic => {
            let small_client = completion::AnthropicClient {
                http: http.clone(),
                base_url: args.base_url(),
                api_key: api_key.clone(),
                model: args.small_model(),
            };
            build_small_model_helpers(small_client, small_model::WireFormat::Anthropic, args.context_window_tokens)
        }
    };

    let reasoning_effort = args.reasoning_effort.map(Into::into);

    let mut history = History::new();
    let mut context_space = ContextSpace::new();
    let mut windowing_notice = false;

    print!("> ");
    std::io::stdout().flush().ok();

    let prompt_source: Box<dyn Iterator<Item = String>> = match &args.prompt {
        Some(p) => Box::new(std::iter::once(p.clone())),
        None => Box::new(std::io::stdin().lines().map_while(Result::ok)),
    };

    for line in prompt_source {
        let user_id = history.next_id();
        history.append(HistoryItem::User {
            id: user_id,
            content: line,
            images: vec![],
        });

        loop {
            let abort = CancellationToken::new();

            if let Err(err) = octo_loop::maybe_compact(
                &mut history,
                summarizer.as_ref(),
                octo_loop::estimate_tokens,
                args.compaction_threshold_tokens,
            )
            .await
            {
                eprintln!("\ncompaction failed: {err}");
            }

            let system_prompt = system_prompt::build(
                &registry,
                &system_prompt::SystemPromptInputs {
                    user_name: &args.user_name,
                    mode,
                    plan_file_path: plan_file_path.as_deref(),
                    workspace: &workspace,
                    cwd_entries: &cwd_entries,
                    windowing_notice,
                },
            );

            let context_block = context_space.render(&*local_transport, &abort).await.to_prompt_text();

            let tool_ctx = ToolContext {
                abort: abort.clone(),
                ..tool_ctx.clone()
            };

            let (tool_call, applied_window) = match args.provider {
                Provider::Openai => {
                    run_turn_openai(
                        &args,
                        &api_key,
                        &http,
                        &system_prompt,
                        &context_block,
                        &mut history,
                        &registry,
                        reasoning_effort,
                        Some(json_autofixer.as_ref()),
                        abort,
                    )
                    .await?
                }
                Provider::Anthropic => {
                    run_turn_anthropic(
                        &args,
                        &api_key,
                        &http,
                        &system_prompt,
                        &context_block,
                        &mut history,
                        &registry,
                        reasoning_effort,
                        Some(json_autofixer.as_ref()),
                        abort,
                    )
                    .await?
                }
            };
            windowing_notice = applied_window;

            context_space.observe(&history.items()[history.items().len().saturating_sub(2)..]);
            if let Some(min_seq) = history.min_visible_id() {
                context_space.window(min_seq);
            }

            let Some(call) = tool_call else { break };

            if octo_tools::requires_confirmation(&call.name, mode) && !confirm(&call.name) {
                octo_loop::record_tool_reject(&mut history, &call);
                continue;
            }

            octo_loop::dispatch_and_record(
                &mut history,
                &call,
                &registry,
                &tool_ctx,
                Some(diff_autofixer.as_ref()),
                &tool_ctx.abort,
            )
            .await;
        }

        print!("> ");
        std::io::stdout().flush().ok();
    }

    Ok(())
}

fn build_small_model_helpers<C>(
    client: C,
    wire_format: small_model::WireFormat,
    context_window_tokens: u32,
) -> (Box<dyn JsonAutofixer>, Box<dyn DiffAutofixer>, Box<dyn Summarizer>)
where
    C: octo_loop::CompletionClient + Clone + 'static,
{
    let make = || small_model::OneShotClient {
        client: client.clone(),
        wire_format,
        context_window_tokens,
    };
    (
        Box::new(small_model::JsonAutofixClient { inner: make() }),
        Box::new(small_model::DiffAutofixClient { inner: make() }),
        Box::new(small_model::CliSummarizer { inner: make() }),
    )
}

#[allow(clippy::too_many_arguments)]
async fn run_turn_openai(
    args: &Args,
    api_key: &str,
    http: &reqwest::Client,
    system_prompt: &str,
    context_block: &str,
    history: &mut History,
    registry: &ToolRegistry,
    reasoning_effort: Option<octo_providers::ReasoningEffort>,
    json_autofixer: Option<&dyn JsonAutofixer>,
    abort: CancellationToken,
) -> anyhow::Result<(Option<octo_protocol::ToolCall>, bool)> {
    let client = completion::OpenAiClient {
        http: http.clone(),
        base_url: args.base_url(),
        api_key: api_key.to_string(),
        model: args.model.clone(),
    };
    let agent = octo_loop::AgentLoop {
        completion_client: client,
        context_window_tokens: args.context_window_tokens,
        window_headroom_tokens: args.context_window_tokens / 10,
        reasoning_effort,
    };
    let compiler = OpenAiCompiler {
        system_prompt: system_prompt.to_string(),
    };
    let outcome = agent
        .run_turn(
            history,
            &compiler,
            context_block,
            Some(registry),
            json_autofixer,
            0,
            abort,
            &mut print_tokens,
        )
        .await?;
    Ok((outcome.tool_call, outcome.applied_window))
}

#[allow(clippy::too_many_arguments)]
async fn run_turn_anthropic(
    args: &Args,
    api_key: &str,
    http: &reqwest::Client,
    system_prompt: &str,
    context_block: &str,
    history: &mut History,
    registry: &ToolRegistry,
    reasoning_effort: Option<octo_providers::ReasoningEffort>,
    json_autofixer: Option<&dyn JsonAutofixer>,
    abort: CancellationToken,
) -> anyhow::Result<(Option<octo_protocol::ToolCall>, bool)> {
    let client = completion::AnthropicClient {
        http: http.clone(),
        base_url: args.base_url(),
        api_key: api_key.to_string(),
        model: args.model.clone(),
    };
    let agent = octo_loop::AgentLoop {
        completion_client: client,
        context_window_tokens: args.context_window_tokens,
        window_headroom_tokens: args.context_window_tokens / 10,
        reasoning_effort,
    };
    let compiler = AnthropicCompiler {
        system_prompt: system_prompt.to_string(),
    };
    let outcome = agent
        .run_turn(
            history,
            &compiler,
            context_block,
            Some(registry),
            json_autofixer,
            0,
            abort,
            &mut print_tokens,
        )
        .await?;
    Ok((outcome.tool_call, outcome.applied_window))
}

fn print_tokens(text: &str, kind: octo_loop::TokenKind) {
    match kind {
        octo_loop::TokenKind::Content => print!("{text}"),
        octo_loop::TokenKind::Reasoning => eprint!("{text}"),
    }
    std::io::stdout().flush().ok();
}

fn confirm(tool_name: &str) -> bool {
    print!("\nRun {tool_name}? [y/N] ");
    std::io::stdout().flush().ok();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn build_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(builtin::ReadTool));
    registry.register(Box::new(builtin::ListTool));
    registry.register(Box::new(builtin::ShellTool));
    registry.register(Box::new(builtin::EditTool));
    registry.register(Box::new(builtin::CreateTool));
    registry.register(Box::new(builtin::AppendTool));
    registry.register(Box::new(builtin::PrependTool));
    registry.register(Box::new(builtin::RewriteTool));
    registry.register(Box::new(builtin::FetchTool));
    registry.register(Box::new(builtin::McpTool));
    registry.register(Box::new(builtin::SkillTool));
    registry.register(Box::new(builtin::WritePlanTool));
    registry.register(Box::new(builtin::WebSearchTool));
    registry.register(Box::new(builtin::TaskTool));
    registry
}
