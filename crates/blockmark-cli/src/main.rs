mod keymap;
mod render;
mod theme;

use anyhow::{Context, Result};
use blockmark_config::{Config, EditorSection};
use blockmark_engine::document::Document;
use blockmark_engine::io::{self, IoError};
use blockmark_engine::{Editor, EditorOptions};
use blockmark_syntax::GrammarRegistry;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use keymap::Action;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{
    env,
    fs::File,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

struct App {
    path: PathBuf,
    editor: Editor,
    saved_version: u64,
    status: String,
}

impl App {
    fn new(path: PathBuf, options: EditorOptions) -> Result<Self> {
        let doc = match io::load_document(&path) {
            Ok(doc) => doc,
            Err(IoError::NotFound(_)) => {
                log::info!("{} does not exist yet, starting empty", path.display());
                Document::default()
            }
            Err(e) => return Err(e).context(format!("Failed to open {}", path.display())),
        };
        let registry = GrammarRegistry::with_builtin_languages()?;
        let editor = Editor::new(doc, Box::new(registry), options);
        let saved_version = editor.document().version();

        Ok(Self {
            path,
            editor,
            saved_version,
            status: String::new(),
        })
    }

    fn is_modified(&self) -> bool {
        self.editor.document().version() != self.saved_version
    }

    fn save(&mut self) {
        match io::save_document(&self.path, self.editor.document()) {
            Ok(()) => {
                self.saved_version = self.editor.document().version();
                self.status = format!("Saved {}", self.path.display());
            }
            Err(e) => self.status = format!("Save failed: {e}"),
        }
    }

    fn export(&mut self) {
        self.status = match io::export_markdown(&self.path, self.editor.document()) {
            Ok(target) => format!("Exported {}", target.display()),
            Err(e) => format!("Export failed: {e}"),
        };
    }

    /// Returns false when the app should exit.
    fn handle(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Save => self.save(),
            Action::Export => self.export(),
            Action::ToggleBlock(kind) => {
                if let Err(e) = self.editor.toggle_block(kind) {
                    self.status = format!("Cannot change block: {e}");
                }
            }
            Action::Edit(key) => {
                if self.editor.on_key_down(key) {
                    self.status.clear();
                }
            }
            Action::Ignore => {}
        }
        true
    }
}

fn editor_options(section: &EditorSection) -> EditorOptions {
    EditorOptions {
        indent_width: section.indent_width,
        fallback_grammar: section.fallback_language.clone(),
        languages: section.languages.clone(),
    }
}

/// Sends log output to the configured file. Without one nothing is logged,
/// since stderr would draw over the editor.
fn init_logging(config: &Config) -> Result<()> {
    let Some(log_file) = &config.log_file else {
        return Ok(());
    };
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <document-path>", args[0]);
        process::exit(1);
    }
    let path = PathBuf::from(&args[1]);

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", Config::config_path().display());
            process::exit(1);
        }
    };
    init_logging(&config)?;
    log::info!("blockmark starting on {}", path.display());

    let mut app = App::new(path, editor_options(&config.editor))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle(keymap::action_for(key))
        {
            return Ok(());
        }
        // Deferred work queued by the last key runs before the next frame.
        app.editor.tick();
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)].as_ref())
        .split(f.area());

    let table = app.editor.decorations();
    let rendered = render::document_lines(app.editor.document(), &table);
    let visible = chunks[0].height.saturating_sub(2) as usize;
    let scroll = rendered.cursor_line.saturating_sub(visible.saturating_sub(1));

    let title = format!(
        "{}{}",
        app.path.display(),
        if app.is_modified() { " [+]" } else { "" }
    );
    let content = Paragraph::new(rendered.lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(content, chunks[0]);

    let warnings = app.editor.warnings().len();
    let status = if !app.status.is_empty() {
        app.status.clone()
    } else if warnings > 0 {
        format!("{warnings} highlighting warning(s), see log")
    } else {
        String::new()
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(status, Style::default().fg(Color::Yellow)))),
        chunks[1],
    );

    let help_text = Line::from(vec![
        Span::raw("Esc: Quit | "),
        Span::raw("Ctrl+S: Save | "),
        Span::raw("Ctrl+E: Export .md | "),
        Span::raw("Alt+1/2/3 q b n c p: Block type"),
    ]);
    f.render_widget(Paragraph::new(help_text), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_maps_onto_editor_options() {
        let section = EditorSection {
            indent_width: 4,
            fallback_language: "plain".to_string(),
            languages: vec!["python".to_string()],
        };
        assert_eq!(
            editor_options(&section),
            EditorOptions {
                indent_width: 4,
                fallback_grammar: "plain".to_string(),
                languages: vec!["python".to_string()],
            }
        );
    }

    #[test]
    fn default_config_matches_default_editor() {
        assert_eq!(
            editor_options(&EditorSection::default()),
            EditorOptions::default()
        );
    }
}
