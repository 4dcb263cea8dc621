use crate::animations::particles::hue_to_rgb;
use crate::animations::victory::BANNER;
use crate::app::{leaderboard_filters, App, LeaderboardView, MenuItem, ScreenState, SettingsItem};
use crate::leaderboard::LeaderboardEntry;
use crate::stats::{format_time, CaseResult};
use casefile_core::{Case, Cell, Difficulty, Mark, Session};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io;

/// Width of the subject label column
const LABEL_WIDTH: usize = 14;
/// Width of one item column, excluding the separator
const COL_WIDTH: usize = 8;

const TITLE: &str = r#"
  ___   _   ___ ___ ___ ___ _    ___
 / __| /_\ / __| __| __|_ _| |  | __|
| (__ / _ \\__ \ _|| _| | || |__| _|
 \___/_/ \_\___/___|_| |___|____|___|
"#;

pub fn render(stdout: &mut io::Stdout, app: &mut App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(stdout, Hide)?;

    match app.screen_state {
        // Redraws the whole screen every frame
        ScreenState::Victory => render_victory_screen(stdout, app, term_width, term_height)?,
        screen => {
            execute!(
                stdout,
                SetBackgroundColor(app.theme.bg),
                Clear(ClearType::All)
            )?;
            match screen {
                ScreenState::MainMenu => render_main_menu(stdout, app, term_width, term_height)?,
                ScreenState::CaseSelect => render_case_select(stdout, app, term_width, term_height)?,
                ScreenState::Story => render_story(stdout, app, term_width, term_height)?,
                ScreenState::Puzzle => render_puzzle(stdout, app, term_width, term_height)?,
                ScreenState::Leaderboard => {
                    render_leaderboard_screen(stdout, app, term_width, term_height)?
                }
                ScreenState::Settings => render_settings(stdout, app, term_width, term_height)?,
                ScreenState::Daily => render_daily(stdout, app, term_width, term_height)?,
                ScreenState::Victory => {}
            }
        }
    }

    if let Some(msg) = &app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    if app.take_bell() {
        execute!(stdout, Print('\x07'))?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

fn center_x(term_width: u16, text: &str) -> u16 {
    term_width.saturating_sub(text.chars().count() as u16) / 2
}

/// Clip or pad a label to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{:<width$}", text, width = width)
    } else {
        let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    }
}

fn stars_string(stars: u8) -> String {
    (1..=3)
        .map(|i| if i <= stars { '★' } else { '☆' })
        .collect()
}

fn difficulty_color(app: &App, difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => app.theme.success,
        Difficulty::Medium => app.theme.key,
        Difficulty::Hard => app.theme.error,
    }
}

fn render_title(stdout: &mut io::Stdout, app: &App, title: &str, term_width: u16) -> io::Result<()> {
    let title = format!("═══ {} ═══", title);
    execute!(
        stdout,
        MoveTo(center_x(term_width, &title), 1),
        SetForegroundColor(app.theme.key),
        SetBackgroundColor(app.theme.bg),
        Print(&title)
    )
}

fn render_controls(
    stdout: &mut io::Stdout,
    app: &App,
    controls: &[(&str, &str)],
    x: u16,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;

    execute!(stdout, SetBackgroundColor(theme.bg))?;

    // Display in columns of 3
    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 3;
        let row = i % 3;
        let cx = x + (col as u16) * 20;
        let cy = y + row as u16;

        execute!(
            stdout,
            MoveTo(cx, cy),
            SetForegroundColor(theme.key),
            Print(format!("{:>8}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }

    Ok(())
}

fn render_message(
    stdout: &mut io::Stdout,
    app: &App,
    msg: &str,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);

    execute!(
        stdout,
        MoveTo(center_x(term_width, &padded), 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.selected_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )?;

    Ok(())
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_width && !current.is_empty() {
            lines.push(current);
            current = String::new();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// Menus

fn render_main_menu(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;

    let lines: Vec<&str> = TITLE.lines().filter(|l| !l.is_empty()).collect();
    let title_width = lines.iter().map(|l| l.len()).max().unwrap_or(36) as u16;
    let title_x = term_width.saturating_sub(title_width) / 2;
    for (i, line) in lines.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(title_x, 2 + i as u16),
            SetForegroundColor(theme.key),
            Print(line)
        )?;
    }

    let tagline = "Logic-grid mysteries for the terminal";
    let y = 3 + lines.len() as u16;
    execute!(
        stdout,
        MoveTo(center_x(term_width, tagline), y),
        SetForegroundColor(theme.info),
        Print(tagline)
    )?;

    let menu_y = y + 2;
    let menu_x = term_width.saturating_sub(24) / 2;
    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let selected = i == app.menu_selection;
        let (fg, bg) = if selected {
            (theme.fg, theme.selected_bg)
        } else {
            (theme.label, theme.bg)
        };
        let marker = if selected { "▶" } else { " " };
        execute!(
            stdout,
            MoveTo(menu_x, menu_y + i as u16),
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Print(format!(" {} {:<20}", marker, item.label())),
            SetBackgroundColor(theme.bg)
        )?;
    }

    let progress = &app.stats.progress;
    let summary = format!(
        "{}  |  Solved {}/{}  |  Score {}",
        app.settings.player_name,
        progress.cases_completed.len(),
        app.catalog.len(),
        progress.total_score
    );
    let summary_y = menu_y + MenuItem::ALL.len() as u16 + 1;
    execute!(
        stdout,
        MoveTo(center_x(term_width, &summary), summary_y),
        SetForegroundColor(theme.info),
        Print(&summary)
    )?;

    if app.settings.notifications && !app.daily_solved() {
        if let Some(case) = app.daily_case() {
            let reminder = format!("Today's daily challenge awaits: {}", case.title());
            execute!(
                stdout,
                MoveTo(center_x(term_width, &reminder), summary_y + 2),
                SetForegroundColor(theme.success),
                Print(&reminder)
            )?;
        }
    }

    if let Some(last) = app.stats.recent(1).first() {
        let outcome = match last.result {
            CaseResult::Solved => format!("solved for {} pts", last.score.unwrap_or(0)),
            CaseResult::Abandoned => "abandoned".to_string(),
        };
        let line = format!("Last case: {} ({})", last.title, outcome);
        execute!(
            stdout,
            MoveTo(center_x(term_width, &line), summary_y + 3),
            SetForegroundColor(theme.border),
            Print(&line)
        )?;
    }

    render_controls(
        stdout,
        app,
        &[
            ("j/k", "Move"),
            ("Enter", "Select"),
            ("q", "Quit"),
            ("c", "Case files"),
            ("d", "Daily"),
            ("l", "Leaderboard"),
        ],
        term_width.saturating_sub(48) / 2,
        term_height.saturating_sub(4),
    )
}

fn render_case_select(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    render_title(stdout, app, "CASE FILES", term_width)?;

    let list_x = 4;
    let list_y = 4;
    for (i, case) in app.catalog.cases().iter().enumerate() {
        let selected = i == app.case_selection;
        let locked = app.is_locked(case);
        let done = if app.stats.is_completed(case.id()) {
            "✓"
        } else {
            " "
        };
        let bg = if selected { theme.selected_bg } else { theme.bg };
        let fg = if locked { theme.locked } else { theme.fg };

        execute!(
            stdout,
            MoveTo(list_x, list_y + i as u16),
            SetBackgroundColor(bg),
            SetForegroundColor(theme.success),
            Print(format!(" {} ", done)),
            SetForegroundColor(fg),
            Print(fit(case.title(), 26)),
            SetForegroundColor(difficulty_color(app, case.difficulty())),
            Print(format!(" {:<7}", case.difficulty())),
            SetForegroundColor(theme.locked),
            Print(if locked { " [locked] " } else { "          " }),
            SetBackgroundColor(theme.bg)
        )?;
    }

    if let Some(case) = app.catalog.cases().get(app.case_selection) {
        let detail_x = list_x + 50;
        let width = term_width.saturating_sub(detail_x + 2).max(20) as usize;
        render_case_details(stdout, app, case, detail_x, list_y, width)?;
    }

    render_controls(
        stdout,
        app,
        &[("j/k", "Move"), ("Enter", "Open case"), ("Esc", "Back")],
        4,
        term_height.saturating_sub(4),
    )
}

fn render_case_details(
    stdout: &mut io::Stdout,
    app: &App,
    case: &Case,
    x: u16,
    y: u16,
    width: usize,
) -> io::Result<()> {
    let theme = &app.theme;
    let mut row = y;

    execute!(
        stdout,
        MoveTo(x, row),
        SetForegroundColor(theme.key),
        Print(case.title())
    )?;
    row += 2;

    for line in wrap_text(case.description(), width) {
        execute!(stdout, MoveTo(x, row), SetForegroundColor(theme.fg), Print(line))?;
        row += 1;
    }
    row += 1;

    let limit = case
        .time_limit_minutes()
        .map(|m| format!("{} min", m))
        .unwrap_or_else(|| "none".to_string());
    let facts = [
        format!("Difficulty: {}", case.difficulty()),
        format!("Hints:      {}", case.max_hints()),
        format!("Time limit: {}", limit),
        format!("Suspects:   {}", case.subjects().len()),
    ];
    for fact in facts {
        execute!(stdout, MoveTo(x, row), SetForegroundColor(theme.info), Print(fact))?;
        row += 1;
    }

    if let Some(best) = app.stats.best_for(case.id()) {
        let line = format!(
            "Best: {} pts  {}  {}",
            best.score.unwrap_or(0),
            stars_string(best.stars.unwrap_or(0)),
            format_time(best.time_secs)
        );
        execute!(
            stdout,
            MoveTo(x, row + 1),
            SetForegroundColor(theme.success),
            Print(line)
        )?;
    }

    Ok(())
}

fn render_daily(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    render_title(stdout, app, "DAILY CHALLENGE", term_width)?;

    let Some(case) = app.daily_case() else {
        let empty = "No cases available";
        return execute!(
            stdout,
            MoveTo(center_x(term_width, empty), 4),
            SetForegroundColor(theme.error),
            Print(empty)
        );
    };

    let x = term_width.saturating_sub(60) / 2;
    render_case_details(stdout, app, &case, x, 4, 60)?;

    let status = if app.daily_solved() {
        ("Solved today. Come back tomorrow for a new case.", theme.success)
    } else {
        ("Solve it today for a bonus of 500 points.", theme.key)
    };
    execute!(
        stdout,
        MoveTo(x, term_height.saturating_sub(7)),
        SetForegroundColor(status.1),
        Print(status.0)
    )?;

    render_controls(
        stdout,
        app,
        &[("Enter", "Investigate"), ("Esc", "Back")],
        x,
        term_height.saturating_sub(4),
    )
}

fn render_story(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let Some(session) = &app.session else {
        return Ok(());
    };
    let case = session.case();

    render_title(stdout, app, case.title(), term_width)?;

    let width = (term_width.saturating_sub(8) as usize).min(72);
    let x = term_width.saturating_sub(width as u16) / 2;
    let mut row = 3;

    let header = format!(
        "{}  {}{}",
        case.difficulty(),
        "★".repeat(case.difficulty().stars() as usize),
        if session.is_daily() { "  · Daily challenge" } else { "" }
    );
    execute!(
        stdout,
        MoveTo(x, row),
        SetForegroundColor(difficulty_color(app, case.difficulty())),
        Print(header)
    )?;
    row += 2;

    for line in wrap_text(case.story(), width) {
        execute!(stdout, MoveTo(x, row), SetForegroundColor(theme.fg), Print(line))?;
        row += 1;
    }
    row += 1;

    let suspects = format!(
        "{}: {}",
        case.subject_category().name,
        case.subjects().join(", ")
    );
    for line in wrap_text(&suspects, width) {
        execute!(stdout, MoveTo(x, row), SetForegroundColor(theme.label), Print(line))?;
        row += 1;
    }
    for category in case.attribute_categories() {
        let line = format!("{}: {}", category.name, category.items.join(", "));
        execute!(stdout, MoveTo(x, row), SetForegroundColor(theme.info), Print(line))?;
        row += 1;
    }

    render_controls(
        stdout,
        app,
        &[("Enter", "Begin investigation"), ("Esc", "Back")],
        x,
        term_height.saturating_sub(4),
    )
}

// Puzzle

fn render_puzzle(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let Some(session) = &app.session else {
        return Ok(());
    };

    render_status_bar(stdout, app, session, 2)?;

    if session.is_paused() {
        render_popup(
            stdout,
            app,
            &["PAUSED", "", "Press p to resume"],
            term_width,
            term_height,
        )?;
    } else {
        let grid_bottom = render_grid(stdout, app, session, 2, 4)?;
        render_clues(stdout, app, session, 2, grid_bottom + 1, term_width)?;
    }

    render_controls(
        stdout,
        app,
        &[
            ("hjkl", "Move"),
            ("Space", "Mark cell"),
            ("c", "Check"),
            ("?", "Hint"),
            ("x", "Clear"),
            ("p", "Pause"),
            ("Esc", "Leave case"),
        ],
        2,
        term_height.saturating_sub(4),
    )?;

    if app.confirm_leave {
        render_popup(
            stdout,
            app,
            &["Abandon this case?", "", "y: abandon    n: keep going"],
            term_width,
            term_height,
        )?;
    }

    Ok(())
}

fn render_status_bar(
    stdout: &mut io::Stdout,
    app: &App,
    session: &Session,
    y: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let case = session.case();

    let timer = timer_text(session);
    let timer_color = if session.is_overtime() {
        theme.error
    } else {
        theme.info
    };

    execute!(
        stdout,
        MoveTo(2, y),
        SetForegroundColor(theme.key),
        Print(case.title()),
        SetForegroundColor(difficulty_color(app, case.difficulty())),
        Print(format!("  [{}]", case.difficulty())),
        SetForegroundColor(timer_color),
        Print(format!("  {}", timer)),
        SetForegroundColor(theme.info),
        Print(format!(
            "  Hints {}/{}  Checks {}",
            session.hints_used(),
            case.max_hints(),
            session.checks()
        ))
    )
}

fn timer_text(session: &Session) -> String {
    match session.time_remaining() {
        Some(_) if session.is_overtime() => format!("Time {} (overtime)", session.elapsed_string()),
        Some(left) => format!(
            "Time {} ({} left)",
            session.elapsed_string(),
            format_time(left.as_secs())
        ),
        None => format!("Time {}", session.elapsed_string()),
    }
}

/// "Alice / Crowbar (Items): unknown" for the cell under the cursor
fn cursor_caption(case: &Case, subject: &str, item: &str, mark: Mark) -> String {
    let state = match mark {
        Mark::True => "associated",
        Mark::False => "ruled out",
        Mark::Unknown => "unknown",
    };
    match case.category_of(item) {
        Some(category) => format!("{} / {} ({}): {}", subject, item, category.name, state),
        None => format!("{} / {}: {}", subject, item, state),
    }
}

/// Draw the subject x item grid; returns the row below it
fn render_grid(
    stdout: &mut io::Stdout,
    app: &App,
    session: &Session,
    x: u16,
    y: u16,
) -> io::Result<u16> {
    let theme = &app.theme;
    let case = session.case();
    let grid = session.grid();
    let cursor = app.cursor;

    // Category headers span their columns
    let mut cx = x + LABEL_WIDTH as u16 + 1;
    for category in case.attribute_categories() {
        let span = category.items.len() * (COL_WIDTH + 1) - 1;
        execute!(
            stdout,
            MoveTo(cx, y),
            SetForegroundColor(theme.category_border),
            Print(fit(&format!(" {}", category.name), span))
        )?;
        cx += span as u16 + 1;
    }

    // First column of each category gets a heavier separator
    let mut boundaries = Vec::new();
    let mut start = 0;
    for category in case.attribute_categories() {
        boundaries.push(start);
        start += category.items.len();
    }

    execute!(stdout, MoveTo(x, y + 1), Print(" ".repeat(LABEL_WIDTH)))?;
    for (j, item) in grid.items().iter().enumerate() {
        let sep = if boundaries.contains(&j) { "│" } else { " " };
        let bg = if j == cursor.item {
            theme.highlight_bg
        } else {
            theme.bg
        };
        execute!(
            stdout,
            SetBackgroundColor(theme.bg),
            SetForegroundColor(theme.category_border),
            Print(sep),
            SetBackgroundColor(bg),
            SetForegroundColor(theme.label),
            Print(fit(item, COL_WIDTH))
        )?;
    }
    execute!(stdout, SetBackgroundColor(theme.bg))?;

    let rule_width = grid.items().len() * (COL_WIDTH + 1);
    execute!(
        stdout,
        MoveTo(x, y + 2),
        SetForegroundColor(theme.border),
        Print("─".repeat(LABEL_WIDTH + rule_width))
    )?;

    for (i, subject) in grid.subjects().iter().enumerate() {
        let row_y = y + 3 + i as u16;
        let label_bg = if i == cursor.subject {
            theme.highlight_bg
        } else {
            theme.bg
        };
        execute!(
            stdout,
            MoveTo(x, row_y),
            SetBackgroundColor(label_bg),
            SetForegroundColor(theme.label),
            Print(fit(subject, LABEL_WIDTH))
        )?;

        for (j, mark) in grid.row(i).iter().enumerate() {
            let cell = Cell::new(i, j);
            let sep = if boundaries.contains(&j) { "│" } else { " " };
            let (glyph, color) = match mark {
                Mark::True => ('✓', theme.mark_true),
                Mark::False => ('✗', theme.mark_false),
                Mark::Unknown => ('·', theme.unknown),
            };
            let bg = if cell == cursor {
                theme.selected_bg
            } else if i == cursor.subject || j == cursor.item {
                theme.highlight_bg
            } else {
                theme.bg
            };
            let text = format!("{:^width$}", glyph, width = COL_WIDTH);
            execute!(
                stdout,
                SetBackgroundColor(theme.bg),
                SetForegroundColor(theme.category_border),
                Print(sep),
                SetBackgroundColor(bg),
                SetForegroundColor(color),
                Print(text)
            )?;
        }
        execute!(stdout, SetBackgroundColor(theme.bg))?;
    }

    let mut bottom = y + 3 + grid.subjects().len() as u16;
    if let Some((subject, item)) = grid.labels(cursor) {
        let caption = cursor_caption(case, subject, item, grid.mark_at(cursor).unwrap_or_default());
        execute!(
            stdout,
            MoveTo(x, bottom + 1),
            SetForegroundColor(theme.info),
            Print(caption)
        )?;
        bottom += 2;
    }

    Ok(bottom)
}

fn render_clues(
    stdout: &mut io::Stdout,
    app: &App,
    session: &Session,
    x: u16,
    y: u16,
    term_width: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let width = term_width.saturating_sub(x + 6).max(20) as usize;
    let mut row = y;

    execute!(
        stdout,
        MoveTo(x, row),
        SetForegroundColor(theme.key),
        Print("Clues")
    )?;
    row += 1;

    for (i, clue) in session.case().clues().iter().enumerate() {
        for (n, line) in wrap_text(&clue.text, width).into_iter().enumerate() {
            let prefix = if n == 0 {
                format!("{:>2}. ", i + 1)
            } else {
                "    ".to_string()
            };
            execute!(
                stdout,
                MoveTo(x, row),
                SetForegroundColor(theme.fg),
                Print(prefix),
                Print(line)
            )?;
            row += 1;
        }
    }

    if let Some(fact) = &app.last_hint {
        execute!(
            stdout,
            MoveTo(x, row + 1),
            SetForegroundColor(theme.success),
            Print(format!("Hint: {}", fact))
        )?;
    }

    Ok(())
}

fn render_popup(
    stdout: &mut io::Stdout,
    app: &App,
    lines: &[&str],
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    let x = term_width.saturating_sub(inner as u16 + 2) / 2;
    let y = term_height.saturating_sub(lines.len() as u16 + 2) / 2;

    execute!(
        stdout,
        SetBackgroundColor(theme.selected_bg),
        SetForegroundColor(theme.border),
        MoveTo(x, y),
        Print(format!("┌{}┐", "─".repeat(inner)))
    )?;
    for (i, line) in lines.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(x, y + 1 + i as u16),
            SetForegroundColor(theme.border),
            Print("│"),
            SetForegroundColor(theme.fg),
            Print(format!("{:^width$}", line, width = inner)),
            SetForegroundColor(theme.border),
            Print("│")
        )?;
    }
    execute!(
        stdout,
        MoveTo(x, y + 1 + lines.len() as u16),
        Print(format!("└{}┘", "─".repeat(inner))),
        SetBackgroundColor(theme.bg)
    )
}

// Victory

fn render_victory_screen(
    stdout: &mut io::Stdout,
    app: &mut App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    app.victory_screen.resize(term_width, term_height);

    let bg_base = Color::Rgb { r: 8, g: 12, b: 20 };
    execute!(stdout, SetBackgroundColor(bg_base), Clear(ClearType::All))?;

    for particle in app.victory_screen.particles() {
        if particle.is_visible(term_width, term_height) {
            execute!(
                stdout,
                MoveTo(particle.x as u16, particle.y as u16),
                SetForegroundColor(particle.color),
                Print(particle.char)
            )?;
        }
    }

    // Banner
    let lines: Vec<&str> = BANNER.lines().filter(|l| !l.is_empty()).collect();
    let banner_width = lines.iter().map(|l| l.len()).max().unwrap_or(40) as u16;
    let banner_x = term_width.saturating_sub(banner_width) / 2;
    let banner_y = 3;

    for (i, line) in lines.iter().enumerate() {
        let hue = (app.victory_screen.rainbow_offset() + i as f32 * 0.1) % 1.0;
        execute!(
            stdout,
            MoveTo(banner_x, banner_y + i as u16),
            SetForegroundColor(hue_to_rgb(hue)),
            Print(line)
        )?;
    }

    let msg = app.victory_screen.current_message();
    let msg_y = banner_y + lines.len() as u16 + 2;
    let hue = (app.victory_screen.rainbow_offset() * 2.0) % 1.0;
    execute!(
        stdout,
        MoveTo(center_x(term_width, msg), msg_y),
        SetForegroundColor(hue_to_rgb(hue)),
        Print(msg)
    )?;

    if let Some(victory) = &app.victory {
        let record = &victory.record;
        let summary = format!(
            "{} | Time: {} | Hints: {}/{} | {}",
            record.title,
            format_time(record.time_secs),
            record.hints_used,
            record.max_hints,
            record.difficulty
        );
        execute!(
            stdout,
            MoveTo(center_x(term_width, &summary).saturating_sub(1), msg_y + 2),
            SetForegroundColor(Color::White),
            SetBackgroundColor(Color::Rgb { r: 30, g: 50, b: 30 }),
            Print(format!(" {} ", summary)),
            SetBackgroundColor(bg_base)
        )?;

        let mut score_line = format!("Score: {}   {}", victory.score, stars_string(victory.stars));
        if record.daily {
            score_line.push_str("   Daily bonus!");
        }
        execute!(
            stdout,
            MoveTo(center_x(term_width, &score_line), msg_y + 4),
            SetForegroundColor(Color::Yellow),
            Print(&score_line)
        )?;

        let mut notes = Vec::new();
        if victory.new_best {
            notes.push("New personal best".to_string());
        }
        if let Some(rank) = victory.rank {
            notes.push(format!("Rank #{} on the leaderboard", rank));
        }
        if !notes.is_empty() {
            let line = notes.join("  ·  ");
            execute!(
                stdout,
                MoveTo(center_x(term_width, &line), msg_y + 5),
                SetForegroundColor(Color::Cyan),
                Print(&line)
            )?;
        }
    }

    let mut instr_y = msg_y + 7;
    if let Some(victory) = &app.victory {
        for (i, line) in solution_lines(&victory.assignments).iter().enumerate() {
            execute!(
                stdout,
                MoveTo(center_x(term_width, line), msg_y + 7 + i as u16),
                SetForegroundColor(Color::White),
                Print(line)
            )?;
            instr_y = msg_y + 9 + i as u16;
        }
    }

    let instr = "Enter: menu   n: next case   l: leaderboard   q: quit";
    execute!(
        stdout,
        MoveTo(center_x(term_width, instr), instr_y),
        SetForegroundColor(Color::Yellow),
        Print(instr)
    )?;

    Ok(())
}

// Leaderboard and settings

fn render_leaderboard_screen(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    render_title(stdout, app, "LEADERBOARD", term_width)?;

    // Difficulty filter
    let filter_y = 3;
    execute!(
        stdout,
        MoveTo(4, filter_y),
        SetForegroundColor(theme.info),
        Print("◀ ")
    )?;
    for filter in leaderboard_filters() {
        let name = filter.map_or_else(|| "All".to_string(), |d| d.to_string());
        let color = if filter == app.leaderboard_filter {
            theme.key
        } else {
            theme.border
        };
        execute!(stdout, SetForegroundColor(color), Print(format!(" {} ", name)))?;
    }
    let view = match app.leaderboard_view {
        LeaderboardView::Scores => "Top solves",
        LeaderboardView::Players => "Detectives",
    };
    execute!(
        stdout,
        SetForegroundColor(theme.info),
        Print(format!(" ▶    [{}]", view))
    )?;

    let header_y = filter_y + 2;
    let rows = term_height.saturating_sub(header_y + 7) as usize;

    match app.leaderboard_view {
        LeaderboardView::Scores => {
            execute!(
                stdout,
                MoveTo(4, header_y),
                SetForegroundColor(theme.label),
                Print(format!(
                    "{:>4}  {:<16} {:<24} {:>7} {:>8} {:>5}  {}",
                    "#", "Detective", "Case", "Score", "Time", "Hints", "Stars"
                ))
            )?;
            match app.leaderboard.top(app.leaderboard_filter, rows.max(1)) {
                Ok(entries) if entries.is_empty() => {
                    execute!(
                        stdout,
                        MoveTo(4, header_y + 2),
                        SetForegroundColor(theme.info),
                        Print("No cases closed yet.")
                    )?;
                }
                Ok(entries) => {
                    for (i, entry) in entries.iter().enumerate() {
                        let color = if entry.player_name == app.settings.player_name {
                            theme.success
                        } else {
                            theme.fg
                        };
                        execute!(
                            stdout,
                            MoveTo(4, header_y + 1 + i as u16),
                            SetForegroundColor(color),
                            Print(score_row(entry, i + 1))
                        )?;
                    }
                }
                Err(e) => {
                    execute!(
                        stdout,
                        MoveTo(4, header_y + 2),
                        SetForegroundColor(theme.error),
                        Print(format!("Leaderboard unavailable: {}", e))
                    )?;
                }
            }
        }
        LeaderboardView::Players => {
            execute!(
                stdout,
                MoveTo(4, header_y),
                SetForegroundColor(theme.label),
                Print(format!(
                    "{:>4}  {:<16} {:>10} {:>8}",
                    "#", "Detective", "Total", "Cases"
                ))
            )?;
            match app.leaderboard.standings() {
                Ok(standings) => {
                    for (i, standing) in standings.iter().take(rows).enumerate() {
                        execute!(
                            stdout,
                            MoveTo(4, header_y + 1 + i as u16),
                            SetForegroundColor(theme.fg),
                            Print(format!(
                                "{:>4}  {} {:>10} {:>8}",
                                standing.rank,
                                fit(&standing.player_name, 16),
                                standing.total_score,
                                standing.cases_solved
                            ))
                        )?;
                    }
                }
                Err(e) => {
                    execute!(
                        stdout,
                        MoveTo(4, header_y + 2),
                        SetForegroundColor(theme.error),
                        Print(format!("Leaderboard unavailable: {}", e))
                    )?;
                }
            }
        }
    }

    let status = if app.leaderboard.is_available() {
        "online"
    } else {
        "offline"
    };
    let source = format!("Source: {} ({})", app.leaderboard.backend_name(), status);
    execute!(
        stdout,
        MoveTo(4, term_height.saturating_sub(5)),
        SetForegroundColor(theme.border),
        Print(source)
    )?;

    render_controls(
        stdout,
        app,
        &[("h/l", "Difficulty"), ("Tab", "Switch view"), ("Esc", "Back")],
        4,
        term_height.saturating_sub(4),
    )
}

fn render_settings(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    render_title(stdout, app, "SETTINGS", term_width)?;

    let x = term_width.saturating_sub(44) / 2;
    let on_off = |value: bool| String::from(if value { "On" } else { "Off" });

    for (i, item) in SettingsItem::ALL.iter().enumerate() {
        let value = match item {
            SettingsItem::Theme => app.settings.theme.label().to_string(),
            SettingsItem::Sound => on_off(app.settings.sound),
            SettingsItem::Notifications => on_off(app.settings.notifications),
            SettingsItem::PlayerName => match &app.editing_name {
                Some(name) => format!("{}_", name),
                None => app.settings.player_name.clone(),
            },
        };
        let bg = if i == app.settings_selection {
            theme.selected_bg
        } else {
            theme.bg
        };
        execute!(
            stdout,
            MoveTo(x, 4 + 2 * i as u16),
            SetBackgroundColor(bg),
            SetForegroundColor(theme.label),
            Print(format!(" {:<18}", item.label())),
            SetForegroundColor(theme.key),
            Print(format!("{:<24}", value)),
            SetBackgroundColor(theme.bg)
        )?;
    }

    let location = match app.storage.root() {
        Some(root) => format!("Data: {}", root.display()),
        None => "Data: in memory (not saved)".to_string(),
    };
    execute!(
        stdout,
        MoveTo(x, 5 + 2 * SettingsItem::ALL.len() as u16),
        SetForegroundColor(theme.border),
        Print(location)
    )?;

    let controls: &[(&str, &str)] = if app.editing_name.is_some() {
        &[("Enter", "Save name"), ("Esc", "Cancel")]
    } else {
        &[("j/k", "Move"), ("Enter", "Change"), ("Esc", "Back")]
    };
    render_controls(stdout, app, controls, x, term_height.saturating_sub(4))
}

/// "Subject: item, item" for each subject of a solved case
fn solution_lines(assignments: &[(String, Vec<String>)]) -> Vec<String> {
    assignments
        .iter()
        .map(|(subject, items)| format!("{}: {}", subject, items.join(", ")))
        .collect()
}

/// One line of the score table; `position` stands in when the backend gave no rank
fn score_row(entry: &LeaderboardEntry, position: usize) -> String {
    format!(
        "{:>4}  {} {} {:>7} {:>8} {:>5}  {}",
        entry.rank.unwrap_or(position),
        fit(&entry.player_name, 16),
        fit(&entry.title, 24),
        entry.score,
        format_time(entry.time_secs),
        entry.hints_used,
        stars_string(entry.stars)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use casefile_core::Catalog;

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("the butler was in the pantry all evening", 16);
        assert_eq!(lines, vec!["the butler was", "in the pantry", "all evening"]);
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("Bob", 5), "Bob  ");
        assert_eq!(fit("Co-working Space", 8), "Co-work…");
        assert_eq!(fit("Co-working Space", 8).chars().count(), 8);
    }

    #[test]
    fn test_stars_string() {
        assert_eq!(stars_string(2), "★★☆");
        assert_eq!(stars_string(0), "☆☆☆");
    }

    #[test]
    fn test_timer_counts_down() {
        let case = Catalog::builtin().unwrap().find("diamond-heist").unwrap();
        let mut session = Session::open(case);
        session.show_story().unwrap();
        session.begin().unwrap();
        let timer = timer_text(&session);
        assert!(
            ["Time 00:00 (14:59 left)", "Time 00:00 (15:00 left)"].contains(&timer.as_str()),
            "{timer}"
        );
    }

    #[test]
    fn test_cursor_caption_names_category() {
        let case = Catalog::builtin().unwrap().find("diamond-heist").unwrap();
        assert_eq!(
            cursor_caption(&case, "Alice", "Crowbar", Mark::False),
            "Alice / Crowbar (Items): ruled out"
        );
        assert_eq!(
            cursor_caption(&case, "Alice", "Nowhere", Mark::Unknown),
            "Alice / Nowhere: unknown"
        );
    }

    #[test]
    fn test_solution_lines() {
        let assignments = vec![
            ("Butler".to_string(), vec!["Library".to_string(), "Candlestick".to_string()]),
            ("Maid".to_string(), vec![]),
        ];
        assert_eq!(
            solution_lines(&assignments),
            vec!["Butler: Library, Candlestick", "Maid: "]
        );
    }

    #[test]
    fn test_score_row_rank() {
        let mut entry = LeaderboardEntry {
            player_name: "Ada".to_string(),
            case_id: "missing-manuscript".to_string(),
            title: "The Missing Manuscript".to_string(),
            difficulty: Difficulty::Easy,
            score: 1150,
            time_secs: 95,
            hints_used: 1,
            stars: 2,
            daily: false,
            timestamp: 0,
            rank: Some(2),
        };
        let row = score_row(&entry, 7);
        assert!(row.starts_with("   2  Ada "));
        assert!(row.contains("01:35"));
        assert!(row.ends_with("★★☆"));

        entry.rank = None;
        assert!(score_row(&entry, 7).starts_with("   7  Ada "));
    }
}
