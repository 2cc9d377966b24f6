//! `fumen` entrypoint.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use core_actions::{dispatch, parse_script};
use core_codec::{decode, encode};
use core_config::{LockedPages, load_from};
use core_document::{Document, PageFlags};
use core_state::{EditorOptions, EditorState, FileStore, LockedPagePolicy, SnapshotStore};
use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "fumen", version, about = "Fumen diagram editor")]
struct Args {
    /// Optional configuration file path (overrides discovery of `fumen.toml`).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every page of an encoded diagram (a bare `v115@...` string or a
    /// whole URL).
    Show { data: String },
    /// Decode and re-encode, printing the canonical encoding.
    Normalize { data: String },
    /// Open a diagram, run an editor script over it and print the result.
    Edit {
        /// Encoded diagram to open. Without it the auto-save snapshot is used.
        #[arg(long)]
        data: Option<String>,
        /// Script file; read from stdin when omitted.
        #[arg(long)]
        script: Option<PathBuf>,
        /// Neither read nor write the auto-save snapshot.
        #[arg(long)]
        no_autosave: bool,
    },
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("fumen.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "fumen.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = load_from(args.config.clone())?;
    let result = match args.command {
        Command::Show { data } => show(&data),
        Command::Normalize { data } => normalize(&data),
        Command::Edit {
            data,
            script,
            no_autosave,
        } => edit(&config, data.as_deref(), script.as_deref(), no_autosave),
    };
    if let Err(e) = &result {
        tracing::error!(target: "runtime", error = %format!("{e:#}"), "command_failed");
    }
    info!(target: "runtime", "shutdown");
    result
}

fn show(data: &str) -> Result<()> {
    let doc = decode(data).context("decoding diagram")?;
    print!("{}", describe_document(&doc));
    Ok(())
}

fn normalize(data: &str) -> Result<()> {
    let doc = decode(data).context("decoding diagram")?;
    println!("{}", encode(&doc));
    Ok(())
}

fn edit(
    config: &core_config::Config,
    data: Option<&str>,
    script: Option<&Path>,
    no_autosave: bool,
) -> Result<()> {
    let options = EditorOptions {
        history_depth: config.history_depth(),
        locked_pages: match config.locked_pages() {
            LockedPages::Ignore => LockedPagePolicy::Ignore,
            LockedPages::Reject => LockedPagePolicy::Reject,
        },
    };
    let store: Option<Box<dyn SnapshotStore>> = if no_autosave {
        None
    } else {
        config
            .autosave_path(|| FileStore::default_location().map(|s| s.path().to_path_buf()))
            .map(|path| Box::new(FileStore::new(path)) as Box<dyn SnapshotStore>)
    };

    let (mut state, report) = EditorState::load(data, store, options);
    if let Some(e) = &report.url_error {
        eprintln!("warning: could not decode --data ({e}); starting from an empty diagram");
    }
    if let Some(e) = &report.autosave_error {
        eprintln!("warning: auto-save snapshot unusable ({e}); starting from an empty diagram");
    }
    info!(target: "runtime.startup", source = ?report.source, pages = state.page_count(), "bootstrap_complete");

    let text = match script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading script from stdin")?;
            text
        }
    };
    let actions = parse_script(&text)?;
    for (i, action) in actions.into_iter().enumerate() {
        let result = dispatch(action, &mut state, &[])
            .with_context(|| format!("script command {} failed", i + 1))?;
        if result.show {
            print!("{}", describe_page(state.document(), state.current_index()));
        }
        if result.quit {
            break;
        }
    }
    println!("{}", state.export_encoding());
    Ok(())
}

fn describe_document(doc: &Document) -> String {
    (0..doc.page_count())
        .map(|i| describe_page(doc, i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text block for one page: header line, comment, then the field with the
/// page's piece drawn in.
fn describe_page(doc: &Document, index: usize) -> String {
    let mut out = String::new();
    let Some(page) = doc.page(index) else {
        return out;
    };
    let _ = write!(out, "page {}/{}", index + 1, doc.page_count());
    match page.piece() {
        Some(p) => {
            let _ = write!(
                out,
                "  piece {} {} ({}, {})",
                p.piece(),
                p.rotation().name(),
                p.x(),
                p.y()
            );
        }
        None => out.push_str("  no piece"),
    }
    let flags = doc.flags(index).unwrap_or_default();
    let names: Vec<&str> = [
        (PageFlags::LOCK, "lock"),
        (PageFlags::MIRROR, "mirror"),
        (PageFlags::RISE, "rise"),
        (PageFlags::QUIZ, "quiz"),
        (PageFlags::FROZEN, "frozen"),
    ]
    .into_iter()
    .filter(|(flag, _)| flags.contains(*flag))
    .map(|(_, name)| name)
    .collect();
    if !names.is_empty() {
        let _ = write!(out, "  [{}]", names.join(","));
    }
    out.push('\n');
    if let Some(comment) = doc.comment_text(index).filter(|c| !c.is_empty()) {
        let _ = writeln!(out, "comment: {comment}");
    }
    let mut field = doc.resolved_field(index).unwrap_or_default();
    if let Some(p) = page.piece() {
        field.put(&p);
    }
    let _ = writeln!(out, "{field}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn edit_flags_parse() {
        let args = Args::try_parse_from([
            "fumen",
            "--config",
            "x.toml",
            "edit",
            "--data",
            "v115@vhAAgH",
            "--no-autosave",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("x.toml")));
        match args.command {
            Command::Edit {
                data, no_autosave, ..
            } => {
                assert_eq!(data.as_deref(), Some("v115@vhAAgH"));
                assert!(no_autosave);
            }
            other => panic!("expected edit, got {other:?}"),
        }
    }

    #[test]
    fn describe_page_draws_piece_and_comment() {
        let doc = decode("v115@vhAAgH").unwrap();
        let mut state = EditorState::new(doc);
        let t = core_field::Placement::new(
            core_field::Piece::T,
            core_field::Rotation::Spawn,
            4,
            0,
        )
        .unwrap();
        state.set_piece(Some(t)).unwrap();
        state
            .set_comment(core_document::Comment::Explicit("hi".into()))
            .unwrap();
        assert_eq!(
            describe_page(state.document(), 0),
            "page 1/1  piece T spawn (4, 0)  [lock]\ncomment: hi\n____T_____\n___TTT____\n----------\n__________\n"
        );
    }

    #[test]
    fn describe_document_lists_every_page() {
        let doc = decode("v115@vhBAgHAgH").unwrap();
        let text = describe_document(&doc);
        assert!(text.starts_with("page 1/2  no piece  [lock]\n"));
        assert!(text.contains("\npage 2/2  no piece  [lock]\n"));
    }
}
