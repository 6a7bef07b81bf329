use patter::{LoadReport, MatchDetails, MatchError, MatchOutcome, TrieStats};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(
    input: &str,
    report: &LoadReport,
    stats: &TrieStats,
    outcome: &Result<MatchOutcome, MatchError>,
    details: &MatchDetails,
    color: bool,
) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Matching: \"{}\"", input), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Rules ━━━", ansi::GRAY));
    println!("  {}", palette.paint(report.to_string(), ansi::BLUE));
    println!(
        "  Trie: {} nodes, {} terminals, {} words, depth {}",
        palette.paint(stats.nodes.to_string(), ansi::GREEN),
        palette.paint(stats.terminals.to_string(), ansi::GREEN),
        palette.paint(stats.words.to_string(), ansi::GREEN),
        palette.paint(stats.max_depth.to_string(), ansi::GREEN),
    );
    if !stats.wildcards.is_empty() {
        println!("  Wildcard kinds: {}", palette.dim(format!("{:?}", stats.wildcards)));
    }
    for warning in report.warnings.iter().take(5) {
        println!("  {}", palette.paint(format!("⚠ {warning}"), ansi::YELLOW));
    }
    if report.warnings.len() > 5 {
        println!("  {}", palette.dim(format!("... +{} more warnings", report.warnings.len() - 5)));
    }

    println!("\n{}", palette.paint("━━━ Tokens ━━━", ansi::GRAY));
    println!("  {}", palette.paint(details.tokens.join(" · "), ansi::BLUE));

    println!("\n{}", palette.paint("━━━ Search ━━━", ansi::GRAY));
    println!(
        "  Steps: {} / {}  │  Frames: {}  │  Peak stack: {}",
        palette.paint(details.metrics.steps.to_string(), ansi::GREEN),
        palette.dim(details.budget.to_string()),
        palette.paint(details.metrics.frames.to_string(), ansi::GREEN),
        palette.paint(details.metrics.peak_stack.to_string(), ansi::GREEN),
    );

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    match outcome {
        Ok(out) => {
            println!(
                "  {} {}",
                palette.paint(format!("[{}]", out.category), ansi::GRAY),
                palette.bold(palette.paint(&out.pattern, ansi::GREEN)),
            );
            println!("      {} {}", palette.dim("template:"), palette.paint(&out.template, ansi::CYAN));
            for (slot, star) in out.stars.iter().enumerate() {
                println!(
                    "      {} {}",
                    palette.dim(format!("star {}:", slot + 1)),
                    palette.paint(format!("\"{star}\""), ansi::YELLOW)
                );
            }
        }
        Err(MatchError::NoMatch) => {
            println!("{}", palette.dim("  No pattern matched"));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • No graphed pattern covers this utterance");
            println!("  • One-or-more wildcards (_ or *) had no token to consume");
            println!("\n{}", palette.dim("  Tip: Set PATTER_DEBUG_MATCH=1 to trace the search"));
        }
        Err(err) => {
            println!("  {}", palette.paint(format!("✗ {err}"), ansi::YELLOW));
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!("  Total: {}", palette.paint(format!("{:?}", details.metrics.total), ansi::GREEN));
    println!();
}
