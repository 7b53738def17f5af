use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "muse")]
#[command(about = "MUSE CLI - Persona selection and proactive engagement engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory (defaults to the platform config directory)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Pretend the current time is this RFC 3339 instant
    #[arg(long, global = true)]
    at: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the preset personas and question bank into an empty catalog
    Seed,
    /// Show the effective engine configuration
    Config {
        /// Write the effective configuration to engine.toml
        #[arg(long)]
        write: bool,
    },
    /// Inspect and curate personas
    Persona {
        #[command(subcommand)]
        action: PersonaAction,
    },
    /// Inspect and curate proactive questions
    Question {
        #[command(subcommand)]
        action: QuestionAction,
    },
    /// Pick the persona for a set of topics
    Select {
        /// Subject (user or admin) the turn belongs to
        #[arg(long)]
        subject: String,
        /// Session topic, repeatable
        #[arg(long = "topic")]
        topics: Vec<String>,
        /// Persona id to pin
        #[arg(long)]
        pin: Option<String>,
    },
    /// Plan a full turn: persona, optional question, ledger entry
    Turn {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        session: String,
        /// User message of the session, oldest first, repeatable
        #[arg(long = "message")]
        messages: Vec<String>,
        /// The subject is an administrator
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        pin: Option<String>,
    },
    /// Apply feedback to a persona (and optionally a question)
    Feedback {
        #[arg(long)]
        persona: String,
        /// Rating from 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        not_helpful: bool,
        #[arg(long)]
        comment: Option<String>,
        /// Question the admin answered
        #[arg(long, requires = "response")]
        question: Option<String>,
        /// The admin's answer to the question
        #[arg(long, requires = "question")]
        response: Option<String>,
        /// Outcome of a persona switch this feedback refers to
        #[arg(long, value_enum)]
        switch: Option<SwitchArg>,
        /// Interaction id printed by `turn`
        #[arg(long)]
        interaction: Option<String>,
    },
    /// Suggest a follow-up for an answered question
    FollowUp {
        #[arg(long)]
        question: String,
        #[arg(long)]
        response: String,
    },
}

#[derive(Subcommand)]
enum PersonaAction {
    /// List personas
    List,
    /// Soft-delete a persona
    Deactivate { id: String },
}

#[derive(Subcommand)]
enum QuestionAction {
    /// List question templates
    List {
        #[arg(long)]
        persona: Option<String>,
    },
    /// Soft-delete a question template
    Deactivate { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SwitchArg {
    Accepted,
    Rejected,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env("MUSE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let app = commands::App::open(cli.dir.as_deref(), cli.at.as_deref())?;

    match cli.command {
        Commands::Seed => commands::catalog::seed(&app).await?,
        Commands::Config { write } => commands::catalog::show_config(&app, write)?,
        Commands::Persona { action } => match action {
            PersonaAction::List => commands::catalog::list_personas(&app).await?,
            PersonaAction::Deactivate { id } => commands::catalog::deactivate_persona(&app, &id).await?,
        },
        Commands::Question { action } => match action {
            QuestionAction::List { persona } => {
                commands::catalog::list_questions(&app, persona.as_deref()).await?
            }
            QuestionAction::Deactivate { id } => {
                commands::catalog::deactivate_question(&app, &id).await?
            }
        },
        Commands::Select { subject, topics, pin } => {
            commands::turn::select(&app, subject, topics, pin).await?
        }
        Commands::Turn {
            subject,
            session,
            messages,
            admin,
            pin,
        } => {
            let mut input = muse_application::TurnInput::new(subject, session, messages);
            input.is_admin = admin;
            input.pinned_persona_id = pin;
            commands::turn::plan(&app, input).await?
        }
        Commands::Feedback {
            persona,
            rating,
            not_helpful,
            comment,
            question,
            response,
            switch,
            interaction,
        } => {
            let args = commands::turn::FeedbackArgs {
                persona,
                rating,
                helpful: !not_helpful,
                comment,
                question: question.zip(response),
                interaction,
                switch: switch.map(|s| match s {
                    SwitchArg::Accepted => muse_core::feedback::SwitchOutcome::Accepted,
                    SwitchArg::Rejected => muse_core::feedback::SwitchOutcome::Rejected,
                }),
            };
            commands::turn::feedback(&app, args).await?
        }
        Commands::FollowUp { question, response } => {
            commands::turn::follow_up(&app, &question, &response).await?
        }
    }

    Ok(())
}
