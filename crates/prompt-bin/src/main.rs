//! Entry point: wires CLL/config, enters raw mode, and runs the
//! single-line edit loop until the buffer is submitted or cancelled.

mod app;
mod buffer;
mod cli;
mod editor;
mod keys;
mod logging;
mod render;

use std::io::stdout;
use std::sync::Once;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use prompt_config::load_config;
use prompt_lexer::Lexer;
use prompt_terminal::CrosstermBackend;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use cli::Args;
use editor::{EditorState, Outcome};

/// Owns the process-wide side effects (logging guard, panic hook,
/// terminal raw-mode) that must be set up before and torn down after
/// the edit loop runs.
struct AppStartup {
    backend: CrosstermBackend,
    _log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            _log_guard: None,
        }
    }

    fn configure_logging(&mut self) -> Result<()> {
        self._log_guard = Some(logging::configure_logging()?);
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_hook = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = crossterm::terminal::disable_raw_mode();
                tracing::error!(%info, "panic");
                default_hook(info);
            }));
        });
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let cwd = std::env::current_dir()?;
    let config = load_config(args.config.as_deref(), args.config_dir.as_deref())?;

    let matcher = app::build_matcher(&config);
    let (validators, custom_validators) = app::build_validators(&config, &cwd);
    let theme_name = args.theme.as_deref().unwrap_or("default");
    let (theme_styles, overlay_styles) = if args.no_color {
        (std::collections::HashMap::new(), std::collections::HashMap::new())
    } else {
        let theme_styles = app::build_theme_styles(&config, theme_name);
        let overlay_styles = app::build_overlay_styles(&theme_styles);
        (theme_styles, overlay_styles)
    };
    let category_groups = if args.granularity > 0 {
        prompt_match::expand_category_map(&config.category_maps)
    } else {
        std::collections::HashMap::new()
    };

    let lexer = Lexer::new(matcher);
    let completer = prompt_complete::CommandLineCompleter::new(validators);
    let keymap = load_keymap(&config);

    let mut state = EditorState::new(
        args.initial_text(),
        keymap,
        lexer,
        completer,
        theme_styles,
        overlay_styles,
        category_groups,
        custom_validators,
        cwd.to_string_lossy().into_owned(),
    );

    let guard = startup.backend.enter_guard()?;
    let outcome = run_edit_loop(&mut state);
    drop(guard);

    match outcome? {
        Outcome::Exit { code, print } => {
            let final_line = editor::final_text(&state.text);
            let print = print || args.print;
            if print && !final_line.is_empty() {
                println!("{final_line}");
            }
            let code = if final_line.is_empty() { 1 } else { code };
            std::process::exit(code);
        }
        Outcome::Continue => unreachable!("edit loop only returns on exit"),
    }
}

/// Build a runtime [`prompt_keymap::Keymap`] from the config's bindings,
/// falling back to the built-in defaults for anything left unconfigured.
fn load_keymap(config: &prompt_config::Config) -> prompt_keymap::Keymap {
    let mut keymap = prompt_keymap::default_keymap();

    for (key, command) in &config.keybindings.normal {
        keymap.bind(prompt_keymap::Mode::Normal, key.clone(), command.clone());
    }
    for (key, command) in &config.keybindings.duplicates {
        keymap.bind(prompt_keymap::Mode::Duplicates, key.clone(), command.clone());
    }
    for (alias, expansion) in &config.aliases {
        keymap.alias(alias.clone(), expansion.clone());
    }

    keymap
}

/// Read and dispatch key events until the editor reports an exit
/// [`Outcome`]. `Ctrl-C` is intercepted ahead of the keymap: it always
/// exits with code 130 and never prints, regardless of what a user
/// config binds it to.
fn run_edit_loop(state: &mut EditorState) -> Result<Outcome> {
    let mut out = stdout();
    render::draw(&mut out, state)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        if is_interrupt(&key_event) {
            return Ok(Outcome::Exit { code: 130, print: false });
        }

        if let Some(chord) = keys::chord_for(&key_event) {
            if let Some(command_line) = state.command_for_key(&chord) {
                let outcome = state.execute(&command_line);
                if outcome != Outcome::Continue {
                    return Ok(outcome);
                }
            }
        } else if let Some(ch) = keys::literal_char(&key_event) {
            state.insert_char(ch);
        }

        render::draw(&mut out, state)?;
    }
}

fn is_interrupt(event: &crossterm::event::KeyEvent) -> bool {
    event.modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
        && matches!(event.code, crossterm::event::KeyCode::Char('c'))
}
