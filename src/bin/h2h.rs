use anyhow::{Context, Result, bail};

use skirank_terminal::backend::Backend;
use skirank_terminal::comparison::{self, ComparisonOutcome};
use skirank_terminal::config::{BackendKind, Config};
use skirank_terminal::demo_backend::DemoBackend;
use skirank_terminal::display;
use skirank_terminal::supabase::SupabaseBackend;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let codes: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect();
    let [first, second] = codes.as_slice() else {
        bail!("usage: h2h <fis_code> <fis_code> [--json]");
    };
    let (first, second) = comparison::validate_codes(first, second)?;

    let config = Config::load()?;
    for note in &config.notes {
        eprintln!("{note}");
    }
    let backend: Box<dyn Backend> = match &config.backend {
        BackendKind::Supabase { url, anon_key } => Box::new(SupabaseBackend::new(url, anon_key)),
        BackendKind::Demo => Box::new(DemoBackend::new()),
    };

    let payload = backend.compare_athletes(&first, &second);
    let cmp = match comparison::resolve(&first, &second, payload) {
        ComparisonOutcome::Ready(cmp) => cmp,
        ComparisonOutcome::NotFound => {
            eprintln!("No data for {first} / {second}");
            return Ok(());
        }
        ComparisonOutcome::Failed(err) => {
            return Err(err).with_context(|| format!("compare {first} vs {second}"));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&cmp)?);
        return Ok(());
    }

    let stats = &cmp.stats;
    println!(
        "{} ({}) vs {} ({})",
        cmp.first.name, cmp.first.country, cmp.second.name, cmp.second.country
    );
    println!(
        "shared={} comparable={} ties={}",
        stats.shared_races, stats.comparable_races, stats.ties
    );
    for (label, side) in [(&cmp.first.name, &stats.first), (&cmp.second.name, &stats.second)] {
        println!(
            "  {label:<28} wins={:<3} dnf={:<3} avg={:.1} best={} worst={} top3={} top10={}",
            side.wins,
            side.non_finishes,
            side.average_rank,
            display::format_rank(side.best_rank),
            display::format_rank(side.worst_rank),
            side.top_three,
            side.top_ten
        );
    }
    for (discipline, tally) in &stats.disciplines {
        println!(
            "  {discipline:<20} {}-{} of {}",
            tally.first_wins, tally.second_wins, tally.total
        );
    }
    println!(
        "recent form (last {}): {}-{}",
        stats.recent_form.races, stats.recent_form.first, stats.recent_form.second
    );
    Ok(())
}
