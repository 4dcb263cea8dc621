//! Basic example of using the case engine

use casefile_core::{daily_case, today, Catalog, HintOutcome, Mark, Session};

fn main() -> casefile_core::Result<()> {
    let catalog = Catalog::builtin()?;

    println!("Available cases:");
    for case in catalog.cases() {
        let lock = if case.is_premium() { " (premium)" } else { "" };
        println!("  {:<16} {:<6} {}{}", case.id(), case.difficulty(), case.title(), lock);
    }

    if let Some(case) = daily_case(&catalog, today()) {
        println!("\nToday's daily challenge: {}", case.title());
    }

    // Open a case and read the brief
    let case = catalog.find("diamond-heist")?;
    let mut session = Session::open(case.clone());
    println!("\n{}\n\n{}\n", case.title(), case.story());
    for clue in case.clues() {
        println!("  - {}", clue.text);
    }

    session.begin()?;

    // Spend one hint
    match session.hint()? {
        HintOutcome::Revealed(fact) => println!("\nRevealed: {}", fact),
        HintOutcome::Refused { .. } => println!("\nNo hints left"),
    }

    println!("Correct yet? {}", session.check()?);

    // Fill in the answer the way a player would, one toggle at a time
    for (subject, item, value) in case.solution().iter() {
        while session.grid().get(subject, item) != Some(Mark::from(value)) {
            session.toggle(subject, item)?;
        }
    }
    println!("Correct now? {}", session.check()?);

    if let Some(record) = session.solve_record() {
        println!(
            "Solved in {} with {} hint(s): {} points, {} star(s)",
            session.elapsed_string(),
            record.hints_used,
            record.score(),
            record.stars()
        );
    }

    for (subject, items) in case.assignments() {
        println!("  {} -> {}", subject, items.join(", "));
    }

    Ok(())
}
