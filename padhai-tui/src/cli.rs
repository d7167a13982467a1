use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "padhai-tui")]
#[command(about = "Terminal client for the Padh-AI study tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the interactive UI against the configured backend
    Run,
    /// Run the interactive UI on local in-memory data
    Dev,
    /// Sign in with email and password
    Login,
    /// Create an account
    Register,
    /// Sign out and remove the local session
    Logout,
    /// Print config path and create default file if missing
    ConfigPath,
    /// List revisions, optionally only those on one day
    Revisions {
        /// Day to show, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a revision as completed
    Complete { revision_id: String },
    /// List subjects with their score summaries
    Subjects,
    /// Create a subject
    AddSubject { name: String },
    /// Delete a subject and everything under it
    DeleteSubject { subject_id: String },
    /// List the chapters of a subject with their latest scores
    Chapters { subject_id: String },
    /// Add a chapter to a subject
    AddChapter { subject_id: String, name: String },
    /// Show the score history of a chapter
    Scores {
        subject_id: String,
        chapter_id: String,
    },
    /// Add the first score of a chapter or update its latest one
    SetScore {
        subject_id: String,
        chapter_id: String,
        /// Score percentage, 0-100
        #[arg(long, default_value = "")]
        score: String,
        /// Deadline, YYYY-MM-DD
        #[arg(long, default_value = "")]
        deadline: String,
    },
    /// Show the signed-in student and revision analytics
    Profile,
}
