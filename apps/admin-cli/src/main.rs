mod client;
mod session;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use prettytable::{Cell, Row, Table};

use crate::client::{ApiClient, OrderUpdate, SkillChanges, DEFAULT_API_URL};
use crate::session::Session;

#[derive(Parser)]
#[command(name = "portfolio-admin")]
#[command(about = "Manage portfolio skills and resumes", long_about = None)]
struct Cli {
    #[arg(long, env = "PORTFOLIO_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, default_value = ".portfolio-session.json", help = "Where the login token is kept")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Log in as an admin")]
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "PORTFOLIO_ADMIN_PASSWORD")]
        password: String,
    },

    #[command(about = "Forget the stored login")]
    Logout,

    #[command(about = "Show the logged-in admin")]
    Whoami,

    #[command(subcommand, about = "Manage skills")]
    Skills(SkillCommands),

    #[command(subcommand, about = "Manage resumes")]
    Resume(ResumeCommands),
}

#[derive(Subcommand)]
enum SkillCommands {
    #[command(about = "List all skills, including hidden ones")]
    List,

    #[command(about = "Add a skill")]
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long, help = "Proficiency from 0 to 100")]
        percentage: i64,

        #[arg(short, long, help = "FRONT END, BACK END, DATABASE, TOOLS or OTHER")]
        category: String,
    },

    #[command(about = "Change fields of a skill")]
    Update(UpdateArgs),

    #[command(about = "Delete a skill")]
    Delete { id: String },

    #[command(about = "Set display order, e.g. `reorder <id>=0 <id>=1`")]
    Reorder {
        #[arg(required = true, value_parser = parse_order_update)]
        entries: Vec<OrderUpdate>,
    },
}

#[derive(Args)]
struct UpdateArgs {
    id: String,

    #[arg(short, long)]
    name: Option<String>,

    #[arg(short, long)]
    percentage: Option<i64>,

    #[arg(short, long)]
    category: Option<String>,

    #[arg(long, help = "Show or hide the skill on the public site")]
    active: Option<bool>,
}

#[derive(Subcommand)]
enum ResumeCommands {
    #[command(about = "List uploaded resumes")]
    List,

    #[command(about = "Upload a PDF and make it the active resume")]
    Upload { file: PathBuf },

    #[command(about = "Make a resume the active one")]
    Activate { id: String },

    #[command(about = "Delete a resume and its file")]
    Delete { id: String },

    #[command(about = "Download a resume")]
    Download {
        id: String,

        #[arg(short, long, help = "Output path (defaults to <id>.pdf)")]
        output: Option<PathBuf>,
    },
}

fn parse_order_update(raw: &str) -> Result<OrderUpdate, String> {
    let (id, order) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <id>=<order>, got '{raw}'"))?;
    let order = order
        .parse::<i32>()
        .map_err(|_| format!("order must be an integer, got '{order}'"))?;
    Ok(OrderUpdate {
        id: id.to_string(),
        order,
    })
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = ApiClient::new(&cli.api_url);
    let mut session = Session::load(&cli.session_file)?;

    match cli.command {
        Commands::Login { email, password } => {
            let login = client.login(&email, &password).await?;
            session.begin(login.token, login.user.email.clone())?;
            println!("✅ Logged in as {}", login.user.email);
        }
        Commands::Logout => match session.email().map(str::to_string) {
            Some(email) => {
                session.invalidate()?;
                println!("👋 Logged out {email}");
            }
            None => println!("Not logged in."),
        },
        Commands::Whoami => {
            let me = client.me(&mut session).await?;
            println!("{} ({})", me.email, me.id);
        }
        Commands::Skills(command) => run_skills(&client, &mut session, command).await?,
        Commands::Resume(command) => run_resume(&client, &mut session, command).await?,
    }

    Ok(())
}

async fn run_skills(client: &ApiClient, session: &mut Session, command: SkillCommands) -> Result<()> {
    match command {
        SkillCommands::List => {
            let skills = client.list_skills(session).await?;
            if skills.is_empty() {
                println!("📭 No skills yet.");
                return Ok(());
            }

            let mut table = Table::new();
            table.add_row(Row::new(vec![
                Cell::new("ID"),
                Cell::new("Category"),
                Cell::new("Order"),
                Cell::new("Skill"),
                Cell::new("%"),
                Cell::new("Visible"),
            ]));
            for skill in skills {
                table.add_row(Row::new(vec![
                    Cell::new(&skill.id),
                    Cell::new(&skill.category),
                    Cell::new(&skill.order.to_string()),
                    Cell::new(&skill.skill_name),
                    Cell::new(&skill.percentage.to_string()),
                    Cell::new(if skill.is_active { "yes" } else { "no" }),
                ]));
            }
            table.printstd();
        }
        SkillCommands::Add {
            name,
            percentage,
            category,
        } => {
            let skill = client
                .create_skill(session, &name, percentage, &category)
                .await?;
            println!(
                "✅ Added {} ({}%) to {} at position {}",
                skill.skill_name, skill.percentage, skill.category, skill.order
            );
            println!("   ID: {}", skill.id);
        }
        SkillCommands::Update(args) => {
            let changes = SkillChanges {
                skill_name: args.name,
                percentage: args.percentage,
                category: args.category,
                is_active: args.active,
            };
            let skill = client.update_skill(session, &args.id, &changes).await?;
            println!(
                "✅ Updated {} ({}%, {}, {})",
                skill.skill_name,
                skill.percentage,
                skill.category,
                if skill.is_active { "visible" } else { "hidden" }
            );
        }
        SkillCommands::Delete { id } => {
            client.delete_skill(session, &id).await?;
            println!("🗑️  Skill deleted");
        }
        SkillCommands::Reorder { entries } => {
            let result = client.reorder_skills(session, &entries).await?;
            println!("✅ Reordered {} skill(s)", result.updated);
            for id in result.missing {
                println!("   ⚠️  not found: {id}");
            }
        }
    }
    Ok(())
}

async fn run_resume(client: &ApiClient, session: &mut Session, command: ResumeCommands) -> Result<()> {
    match command {
        ResumeCommands::List => {
            let resumes = client.list_resumes(session).await?;
            if resumes.is_empty() {
                println!("📭 No resumes uploaded.");
                return Ok(());
            }

            let mut table = Table::new();
            table.add_row(Row::new(vec![
                Cell::new("ID"),
                Cell::new("File"),
                Cell::new("Size"),
                Cell::new("Uploaded"),
                Cell::new("Active"),
            ]));
            for resume in resumes {
                let uploaded = resume.uploaded_at.with_timezone(&Local);
                table.add_row(Row::new(vec![
                    Cell::new(&resume.id),
                    Cell::new(&resume.original_name),
                    Cell::new(&format_size(resume.file_size)),
                    Cell::new(&uploaded.format("%Y-%m-%d %H:%M").to_string()),
                    Cell::new(if resume.is_active { "✔" } else { "" }),
                ]));
            }
            table.printstd();
        }
        ResumeCommands::Upload { file } => {
            if file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase)
                != Some("pdf".to_string())
            {
                bail!("Only PDF files are allowed");
            }
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("resume.pdf")
                .to_string();

            let resume = client.upload_resume(session, &file_name, bytes).await?;
            println!("✅ Uploaded {} ({})", resume.original_name, format_size(resume.file_size));
            println!("   ID: {}", resume.id);
        }
        ResumeCommands::Activate { id } => {
            let resume = client.activate_resume(session, &id).await?;
            println!("✅ {} is now the active resume", resume.original_name);
        }
        ResumeCommands::Delete { id } => {
            client.delete_resume(session, &id).await?;
            println!("🗑️  Resume deleted");
        }
        ResumeCommands::Download { id, output } => {
            let bytes = client.download_resume(&id).await?;
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{id}.pdf")));
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("✅ Saved {} ({})", output.display(), format_size(bytes.len() as i64));
        }
    }
    Ok(())
}

fn format_size(bytes: i64) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < KIB * KIB {
        format!("{:.1} KiB", bytes / KIB)
    } else {
        format!("{:.1} MiB", bytes / (KIB * KIB))
    }
}
