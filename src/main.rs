use clap::{Parser, Subcommand};
use git_gutter::{ChangeType, GitGutter};

#[derive(Parser)]
#[command(name = "git-gutter")]
#[command(about = "Inspect and stage git hunks the way an editor gutter sees them")]
struct Cli {
    /// Repository path
    #[arg(short = 'C', long = "repo", default_value = ".")]
    repo: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List change hunks for a file
    Hunks { file: String },
    /// Show gutter signs and aggregate counts for a file
    Signs { file: String },
    /// Stage the hunk containing a line
    Stage { file: String, line: u32 },
    /// Unstage the staged hunk containing a line
    Unstage { file: String, line: u32 },
    /// Revert the hunk containing a line in the working file
    Revert { file: String, line: u32 },
    /// List merge conflict regions in a file
    Conflicts { file: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let gutter = GitGutter::new(&cli.repo);

    match cli.command {
        Commands::Hunks { file } => {
            for hunk in gutter.hunks(&file)? {
                let kind = match hunk.change_type {
                    ChangeType::Add => "add",
                    ChangeType::Delete => "delete",
                    ChangeType::Change => "change",
                };
                println!(
                    "{}-{}\t{}\t-{},{} +{},{}",
                    hunk.start,
                    hunk.effective_end(),
                    kind,
                    hunk.removed.start,
                    hunk.removed.count,
                    hunk.added.start,
                    hunk.added.count,
                );
            }
        }
        Commands::Signs { file } => {
            let update = gutter.signs(&file)?;
            for sign in &update.signs {
                println!("{}\t{}", sign.line, sign.kind.symbol());
            }
            println!("+{} ~{} -{}", update.added, update.changed, update.removed);
        }
        Commands::Stage { file, line } => gutter.stage(&file, line)?,
        Commands::Unstage { file, line } => gutter.unstage(&file, line)?,
        Commands::Revert { file, line } => gutter.revert(&file, line)?,
        Commands::Conflicts { file } => {
            for conflict in gutter.conflicts(&file)? {
                let common = conflict
                    .common
                    .map(|l| format!(" common@{l}"))
                    .unwrap_or_default();
                println!(
                    "{}-{}\t{} vs {}{}",
                    conflict.start, conflict.end, conflict.current, conflict.incoming, common
                );
            }
        }
    }

    Ok(())
}
