//! Colored terminal rendering for feedcal-core types.

use feedcal_core::diff::{CalendarDiff, DiffKind, EventDiff};
use feedcal_core::pipeline::{ConversionReport, RunReport};
use feedcal_core::publish::PublishOutcome;
use feedcal_core::store::WriteOutcome;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for EventDiff {
    fn render(&self) -> String {
        let summary = colorize_diff(self.kind, &self.event.summary);
        let time = self.event.start.to_string();

        let mut line = format!("{} {} {}", self.kind.render(), summary, time.dimmed());
        if self.kind == DiffKind::Update {
            let fields = self.changed_fields().join(", ");
            line.push_str(&format!(" {}", format!("({fields})").dimmed()));
        }
        line
    }
}

/// Above this many changes only counts are shown
const COMPACT_THRESHOLD: usize = 5;

impl Render for CalendarDiff {
    fn render(&self) -> String {
        if self.is_empty() {
            return format!("   {}", "No event changes".dimmed());
        }

        if self.changes.len() <= COMPACT_THRESHOLD {
            return self
                .changes
                .iter()
                .map(|diff| format!("   {}", diff.render()))
                .collect::<Vec<_>>()
                .join("\n");
        }

        let (created, updated, deleted) = self.counts();
        let mut lines = Vec::new();
        if created > 0 {
            let label = format!("({} new {})", created, pluralize("event", created));
            lines.push(format!("   {} {}", DiffKind::Create.render(), label.green()));
        }
        if updated > 0 {
            let label = format!("({} changed {})", updated, pluralize("event", updated));
            lines.push(format!("   {} {}", DiffKind::Update.render(), label.yellow()));
        }
        if deleted > 0 {
            let label = format!("({} removed {})", deleted, pluralize("event", deleted));
            lines.push(format!("   {} {}", DiffKind::Delete.render(), label.red()));
        }
        lines.join("\n")
    }
}

impl Render for WriteOutcome {
    fn render(&self) -> String {
        match self {
            WriteOutcome::Created => "created".green().to_string(),
            WriteOutcome::Updated => "updated".yellow().to_string(),
            WriteOutcome::Unchanged => "unchanged".dimmed().to_string(),
        }
    }
}

impl Render for PublishOutcome {
    fn render(&self) -> String {
        match self {
            PublishOutcome::Disabled => "Publishing disabled".dimmed().to_string(),
            PublishOutcome::NoChanges => "No changes to commit".dimmed().to_string(),
            PublishOutcome::Pushed { commits } => format!(
                "Pushed {} earlier {}",
                commits.yellow(),
                pluralize("commit", *commits)
            ),
            PublishOutcome::Committed {
                commit,
                files,
                pushed,
            } => {
                let short = commit.get(..7).unwrap_or(commit);
                let pushed = if *pushed { " and pushed" } else { "" };
                format!(
                    "Committed {} {}{}",
                    short.yellow(),
                    files.join(", "),
                    pushed
                )
            }
        }
    }
}

impl Render for RunReport {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        match &self.conversion {
            ConversionReport::BuiltIn {
                events,
                skipped,
                write,
                diff,
                exported,
            } => {
                lines.push(format!(
                    "📅 {} {}, calendar {}",
                    events,
                    pluralize("event", *events),
                    write.render()
                ));
                lines.push(diff.render());
                for entry in skipped {
                    lines.push(format!(
                        "   {} {} {}",
                        "?".dimmed(),
                        entry.title,
                        format!("({})", entry.reason).dimmed()
                    ));
                }
                if let Some(exported) = exported {
                    lines.push(format!("   Export copy {}", exported.render()));
                }
            }
            ConversionReport::External { command, exported } => {
                lines.push(format!("📅 Converted with {}", command.bold()));
                if let Some(exported) = exported {
                    lines.push(format!("   Export copy {}", exported.render()));
                }
            }
        }

        if let Some(publish) = &self.publish {
            lines.push(publish.render());
        }

        lines.join("\n")
    }
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
