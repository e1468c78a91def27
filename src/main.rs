mod app;
mod cli;
mod config;
mod diff;
mod error;
mod generate;
mod git;
mod input;
mod logging;
mod model;
mod output;
mod render;
mod syntax;
mod ui;
mod viewer;

use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use app::{App, DiffLoader, GenerateSettings};
use cli::{Cli, Commands, ConfigAction, DiffArgs};
use config::Config;
use error::GitguyError;
use generate::{CommitGenerator, LlModel, OpenRouterClient};
use git::{DiffSelection, RepoInfo, list_refs, load_file_diffs};
use input::{Action, map_key_to_action};
use logging::LogHandle;
use render::{TextOptions, render_side_by_side_from_edits};
use viewer::ViewerOptions;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("failed to load config")?;

    match &cli.command {
        Some(Commands::Config {
            action: ConfigAction::SetKey { key },
        }) => {
            logging::init_stderr(cli.verbose);
            let path = config::save_api_key(key)?;
            println!("API key saved to {}", path.display());
            Ok(())
        }
        Some(Commands::Diff(args)) => run_diff(&cli, &config, args),
        None if cli.non_interactive => run_non_interactive(&cli, &config),
        None => run_generate_ui(&cli, &config),
    }
}

fn generate_settings(cli: &Cli, config: &Config) -> GenerateSettings {
    GenerateSettings {
        api_key: config.resolve_api_key(cli.api_key.as_deref()).ok(),
        model: LlModel::parse(
            cli.model
                .as_deref()
                .or(config.model.as_deref())
                .unwrap_or_default(),
        ),
        pr_template: cli.pr_template.clone().or_else(|| config.pr_template.clone()),
    }
}

fn out_pr(cli: &Cli, config: &Config) -> String {
    cli.out_pr
        .clone()
        .unwrap_or_else(|| config.out_pr().to_string())
}

/// Per-session log file in the config directory, or nothing if it cannot be
/// created.
fn open_log() -> LogHandle {
    config::config_dir()
        .and_then(|dir| LogHandle::open(&dir))
        .unwrap_or_else(|_| LogHandle::none())
}

fn discover_repo() -> RepoInfo {
    match RepoInfo::discover() {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("\nMake sure you're in a git repository.");
            std::process::exit(1);
        }
    }
}

fn load_or_exit(repo_info: &RepoInfo, selection: &DiffSelection) -> Vec<model::FileDiff> {
    match load_file_diffs(&repo_info.repo, selection) {
        Ok(files) => files,
        Err(GitguyError::NoChanges) => {
            eprintln!("No changes found.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn head_label(repo_info: &RepoInfo) -> String {
    repo_info
        .branch_name
        .clone()
        .unwrap_or_else(|| repo_info.short_head().to_string())
}

/// The requested refs, both or neither.
fn ref_pair(cli: &Cli) -> anyhow::Result<Option<(String, String)>> {
    match (&cli.ref_current, &cli.ref_incoming) {
        (Some(base), Some(head)) => Ok(Some((base.clone(), head.clone()))),
        (None, None) => Ok(None),
        _ => bail!("--ref-current and --ref-incoming must be given together"),
    }
}

fn run_non_interactive(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    logging::init_stderr(cli.verbose);

    let Some((base, head)) = ref_pair(cli)? else {
        bail!("--non-interactive requires --ref-current and --ref-incoming");
    };

    let repo_info = RepoInfo::discover()?;
    info!(root = %repo_info.root_path.display(), %base, %head, "comparing revisions");
    let selection = DiffSelection::Revisions {
        from: base.clone(),
        to: head.clone(),
    };
    let files = load_file_diffs(&repo_info.repo, &selection)
        .with_context(|| format!("failed to diff {} against {}", base, head))?;
    let diff = diff::combine_file_diffs(&files)?;
    if diff.trim().is_empty() {
        bail!("no differences found between {} and {}", base, head);
    }

    let settings = generate_settings(cli, config);
    let api_key = config.resolve_api_key(cli.api_key.as_deref())?;
    let mut client = OpenRouterClient::new(api_key, settings.model);
    if let Some(path) = &settings.pr_template {
        client = client.with_pr_template(path)?;
    }

    info!(model = %client.model(), files = files.len(), "generating description");
    let result = client
        .generate(&diff)
        .context("failed to generate commit message")?;

    println!("{}", result.commit_message);

    let path = config::expand_pr_template(&out_pr(cli, config));
    output::save_pr_file(
        Path::new(&path),
        &result.commit_message,
        &base,
        &head,
        &result.pr_description,
    )
    .with_context(|| format!("failed to write {}", path))?;
    eprintln!("PR description written to {}", path);

    Ok(())
}

fn run_generate_ui(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let refs = ref_pair(cli)?;
    let repo_info = discover_repo();

    let app = match refs {
        Some((base, head)) => {
            let selection = DiffSelection::Revisions {
                from: base.clone(),
                to: head.clone(),
            };
            let files = load_or_exit(&repo_info, &selection);
            App::new(
                files,
                (base, head),
                ViewerOptions::default(),
                open_log(),
                generate_settings(cli, config),
                out_pr(cli, config),
            )
        }
        None => {
            let entries = list_refs(&repo_info.repo).context("failed to list refs")?;
            if entries.is_empty() {
                bail!("nothing to compare: the repository has no refs");
            }
            let loader: DiffLoader = Box::new(move |selection: &DiffSelection| {
                load_file_diffs(&repo_info.repo, selection)
            });
            App::with_ref_picker(
                entries,
                loader,
                ViewerOptions::default(),
                open_log(),
                generate_settings(cli, config),
                out_pr(cli, config),
            )
        }
    };
    run_tui(app)
}

fn run_diff(cli: &Cli, config: &Config, args: &DiffArgs) -> anyhow::Result<()> {
    let options = args.viewer_options();
    let settings = generate_settings(cli, config);
    let out_pr = out_pr(cli, config);

    let app = match &args.patch {
        Some(path) => {
            let text = read_patch(path)?;
            let label = path.display().to_string();
            App::from_patch(
                text,
                (label.clone(), label),
                options,
                open_log(),
                settings,
                out_pr,
            )
        }
        None if args.print => {
            let repo_info = discover_repo();
            let files = load_or_exit(&repo_info, &args.selection());
            return print_files(&files, args);
        }
        None => {
            let repo_info = discover_repo();
            let selection = args.selection();
            let target = match selection {
                DiffSelection::Staged => "index",
                _ => "working tree",
            };
            let files = load_or_exit(&repo_info, &selection);
            App::new(
                files,
                (head_label(&repo_info), target.to_string()),
                options,
                open_log(),
                settings,
                out_pr,
            )
        }
    };
    run_tui(app)
}

/// Width assumed when printing and no terminal is attached.
const DEFAULT_PRINT_WIDTH: u16 = 120;

fn print_files(files: &[model::FileDiff], args: &DiffArgs) -> anyhow::Result<()> {
    let width = args
        .width
        .or_else(|| terminal::size().ok().map(|(w, _)| w))
        .unwrap_or(DEFAULT_PRINT_WIDTH);
    let opts = TextOptions {
        width,
        show_whitespace: args.whitespace,
        highlighter: (!args.no_syntax_highlighting).then(|| &*syntax::HIGHLIGHTER),
    };

    let mut stdout = io::stdout().lock();
    for file in files {
        let label = file.display_path().display().to_string();
        let text = render_side_by_side_from_edits(&file.edits, &file.original, &label, &opts);
        writeln!(stdout, "{}", text.trim_end_matches('\n'))?;
    }
    Ok(())
}

fn read_patch(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read diff from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Setup panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (width, height) = terminal::size()?;
    app.resize(width, height);

    let outcome = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    outcome
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    let action = map_key_to_action(key, app.screen);
                    if action == Action::Generate {
                        // The call blocks, so show the status first.
                        app.begin_generate();
                        terminal.draw(|frame| ui::render(frame, app))?;
                    }
                    app.handle_action(action);
                }
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
