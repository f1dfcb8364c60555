//! Peerflow - peer-review learning platform CLI
//!
//! The `peerflow` command is the request layer in front of the workflow
//! engine: it resolves the acting user, invokes one engine operation, and
//! renders the result.
//!
//! ## Commands
//!
//! - `register`: Create a user account
//! - `assignment`: Post or browse assignments
//! - `submit` / `submissions`: Submit work and list submissions
//! - `queue` / `review` / `reviews`: Find reviewable work and review it
//! - `stats`: Show the acting user's progression
//! - `sync`: Manage calendar-sync handshakes
//!
//! Most commands act on behalf of a user; pass `--as <username>`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use peerflow_core::{Engine, EngineError};
use peerflow_domain::{
    Assignment, AssignmentId, Review, Submission, SubmissionId, SyncDecision, SyncRequest,
    SyncRequestId, User,
};
use peerflow_store::{RecordStore, SurrealStore};

#[derive(Parser)]
#[command(name = "peerflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Peer-review learning platform", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON results (and JSON-formatted log lines)
    #[arg(long, global = true)]
    json: bool,

    /// Store directory (overrides PEERFLOW_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Act as this user
    #[arg(long = "as", value_name = "USERNAME", global = true)]
    acting_user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user account
    Register {
        username: String,

        /// Optional profile blurb
        #[arg(long)]
        bio: Option<String>,
    },

    /// Search users by username
    Users {
        query: String,
    },

    /// Show the acting user's aggregate stats
    Stats,

    /// Post or browse assignments
    Assignment {
        #[command(subcommand)]
        action: AssignmentAction,
    },

    /// Submit work against an assignment
    Submit {
        /// Assignment id
        assignment: u64,

        /// Submission content (inline text)
        content: String,
    },

    /// List submissions - yours by default, or an assignment's
    Submissions {
        /// List submissions for this assignment instead
        #[arg(long)]
        assignment: Option<u64>,
    },

    /// List submissions waiting for the acting user's review
    Queue,

    /// Review a submission
    Review {
        /// Submission id
        submission: u64,

        /// Rating, 1-5
        #[arg(short, long)]
        rating: u8,

        /// Review feedback text
        #[arg(short, long)]
        feedback: String,
    },

    /// Show all reviews of a submission
    Reviews {
        /// Submission id
        submission: u64,
    },

    /// Manage calendar-sync handshakes
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
}

#[derive(Subcommand)]
enum AssignmentAction {
    /// Post a new assignment
    Create {
        title: String,

        #[arg(short, long)]
        description: String,

        #[arg(short, long)]
        category: String,

        /// Difficulty grade, 1-5
        #[arg(long)]
        difficulty: u8,

        /// Reviews each submission needs (default from policy: 3)
        #[arg(long)]
        required_reviews: Option<u32>,
    },

    /// Browse the assignment catalog
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Filter by difficulty grade
        #[arg(long)]
        difficulty: Option<u8>,
    },
}

#[derive(Subcommand)]
enum SyncAction {
    /// Ask another user to sync calendars
    Request {
        username: String,
    },

    /// Accept an incoming request
    Accept {
        /// Request id
        request: u64,
    },

    /// Reject an incoming request
    Reject {
        /// Request id
        request: u64,
    },

    /// List pending requests addressed to you
    Incoming,

    /// List your synced peers
    Peers,

    /// Sever the sync relation with a user (any state, either direction)
    Remove {
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    peerflow_core::init_tracing(cli.json, cli.verbose);

    let store: Arc<dyn RecordStore> = match &cli.db {
        Some(path) => {
            let path = path
                .to_str()
                .ok_or_else(|| anyhow!("store path is not valid UTF-8"))?;
            Arc::new(
                SurrealStore::open(path)
                    .await
                    .context("failed to open Peerflow store")?,
            )
        }
        None => Arc::new(
            SurrealStore::from_env()
                .await
                .context("failed to open Peerflow store")?,
        ),
    };
    let engine = Engine::new(store);

    match cli.command {
        Commands::Register { username, bio } => {
            let user = engine.accounts().register(username, bio).await?;
            if cli.json {
                print_json(&user)?;
            } else {
                println!("Registered '{}' (user {})", user.username, user.id);
            }
        }

        Commands::Users { query } => {
            let users = engine.accounts().search(&query).await?;
            if cli.json {
                print_json(&users)?;
            } else if users.is_empty() {
                println!("No users match '{}'", query);
            } else {
                for user in users {
                    println!(
                        "{:>6}  {}  (level {}, {} PRP)",
                        user.id,
                        user.username,
                        user.level(),
                        user.points
                    );
                }
            }
        }

        Commands::Stats => {
            let actor = require_identity(&engine, cli.acting_user.as_deref()).await?;
            let stats = engine.accounts().stats(actor.id).await?;
            if cli.json {
                print_json(&stats)?;
            } else {
                println!("User:         {}", actor.username);
                println!("Level:        {}", stats.level);
                println!("Experience:   {} XP", stats.total_xp);
                println!("PRP points:   {}", stats.points);
                println!("Submissions:  {}", stats.submissions_count);
                println!("Reviews:      {}", stats.reviews_count);
                println!("Mean rating given: {:.2}", stats.average_rating_given);
            }
        }

        Commands::Assignment { action } => match action {
            AssignmentAction::Create {
                title,
                description,
                category,
                difficulty,
                required_reviews,
            } => {
                let actor = require_identity(&engine, cli.acting_user.as_deref()).await?;
                let assignment = engine
                    .assignments()
                    .create(
                        actor.id,
                        title,
                        description,
                        category,
                        difficulty,
                        required_reviews,
                    )
                    .await?;
                if cli.json {
                    print_json(&assignment)?;
                } else {
                    println!(
                        "Posted assignment {} '{}' ({} reviews per submission)",
                        assignment.id, assignment.title, assignment.required_reviews
                    );
                }
            }
            AssignmentAction::List {
                category,
                difficulty,
            } => {
                let assignments = match (category, difficulty) {
                    (Some(category), _) => engine.assignments().by_category(&category).await?,
                    (None, Some(difficulty)) => {
                        engine.assignments().by_difficulty(difficulty).await?
                    }
                    (None, None) => engine.assignments().list().await?,
                };
                if cli.json {
                    print_json(&assignments)?;
                } else if assignments.is_empty() {
                    println!("No assignments found");
                } else {
                    for a in assignments {
                        print_assignment(&a);
                    }
                }
            }
        },

        Commands::Submit {
            assignment,
            content,
        } => {
            let actor = require_identity(&engine, cli.acting_user.as_deref()).await?;
            let submission = engine
                .ledger()
                .create(AssignmentId(assignment), actor.id, content)
                .await?;
            if cli.json {
                print_json(&submission)?;
            } else {
                println!(
                    "Submission {} created ({} reviews required)",
                    submission.id, submission.reviews_required
                );
            }
        }

        Commands::Submissions { assignment } => {
            let submissions = match assignment {
                Some(id) => engine.ledger().by_assignment(AssignmentId(id)).await?,
                None => {
                    let actor = require_identity(&engine, cli.acting_user.as_deref()).await?;
                    engine.ledger().by_author(actor.id).await?
                }
            };
            if cli.json {
                print_json(&submissions)?;
            } else if submissions.is_empty() {
                println!("No submissions found");
            } else {
                for s in submissions {
                    print_submission(&s);
                }
            }
        }

        Commands::Queue => {
            let actor = require_identity(&engine, cli.acting_user.as_deref()).await?;
            let queue = engine.matcher().pending_for(actor.id).await?;
            if cli.json {
                print_json(&queue)?;
            } else if queue.is_empty() {
                println!("Nothing to review right now");
            } else {
                for s in queue {
                    print_submission(&s);
                }
            }
        }

        Commands::Review {
            submission,
            rating,
            feedback,
        } => {
            let actor = require_identity(&engine, cli.acting_user.as_deref()).await?;
            let review = engine
                .scorer()
                .submit_review(SubmissionId(submission), actor.id, rating, feedback)
                .await?;
            if cli.json {
                print_json(&review)?;
            } else {
                println!(
                    "Review {} recorded ({} tier, +{} PRP)",
                    review.id, review.quality, review.points_awarded
                );
            }
        }

        Commands::Reviews { submission } => {
            let reviews = engine
                .scorer()
                .reviews_for(SubmissionId(submission))
                .await?;
            if cli.json {
                print_json(&reviews)?;
            } else if reviews.is_empty() {
                println!("No reviews yet");
            } else {
                for r in reviews {
                    print_review(&r);
                }
            }
        }

        Commands::Sync { action } => {
            let actor = require_identity(&engine, cli.acting_user.as_deref()).await?;
            match action {
                SyncAction::Request { username } => {
                    let peer = resolve_user(&engine, &username).await?;
                    let request = engine.handshake().request(actor.id, peer.id).await?;
                    if cli.json {
                        print_json(&request)?;
                    } else {
                        println!("Sync request {} sent to '{}'", request.id, peer.username);
                    }
                }
                SyncAction::Accept { request } => {
                    let request = engine
                        .handshake()
                        .respond(SyncRequestId(request), actor.id, SyncDecision::Accept)
                        .await?;
                    report_resolution(cli.json, &request)?;
                }
                SyncAction::Reject { request } => {
                    let request = engine
                        .handshake()
                        .respond(SyncRequestId(request), actor.id, SyncDecision::Reject)
                        .await?;
                    report_resolution(cli.json, &request)?;
                }
                SyncAction::Incoming => {
                    let incoming = engine.handshake().incoming(actor.id).await?;
                    if cli.json {
                        print_json(&incoming)?;
                    } else if incoming.is_empty() {
                        println!("No pending sync requests");
                    } else {
                        for request in incoming {
                            let from = engine.accounts().user(request.from_user_id).await;
                            let from = from
                                .map(|u| u.username)
                                .unwrap_or_else(|_| request.from_user_id.to_string());
                            println!("{:>6}  from {}", request.id, from);
                        }
                    }
                }
                SyncAction::Peers => {
                    let peers = engine.handshake().synced_peers(actor.id).await?;
                    if cli.json {
                        print_json(&peers)?;
                    } else if peers.is_empty() {
                        println!("No synced peers");
                    } else {
                        for peer in peers {
                            println!("{:>6}  {}", peer.id, peer.username);
                        }
                    }
                }
                SyncAction::Remove { username } => {
                    let peer = resolve_user(&engine, &username).await?;
                    let removed = engine.handshake().remove(actor.id, peer.id).await?;
                    if cli.json {
                        print_json(&serde_json::json!({ "removed": removed }))?;
                    } else if removed == 0 {
                        println!("No sync relation with '{}'", peer.username);
                    } else {
                        println!("Removed sync relation with '{}'", peer.username);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Resolve `--as <username>` into a user, or fail `Unauthenticated`.
async fn require_identity(engine: &Engine, acting_user: Option<&str>) -> Result<User> {
    let username = acting_user.ok_or(EngineError::Unauthenticated)?;
    resolve_user(engine, username).await
}

async fn resolve_user(engine: &Engine, username: &str) -> Result<User> {
    engine
        .accounts()
        .by_username(username)
        .await?
        .ok_or_else(|| anyhow!("unknown user: {username}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_assignment(a: &Assignment) {
    println!(
        "{:>6}  [{}] {} (difficulty {}, {} reviews)",
        a.id, a.category, a.title, a.difficulty, a.required_reviews
    );
}

fn print_submission(s: &Submission) {
    println!(
        "{:>6}  assignment {}  {}  reviews {}/{}",
        s.id, s.assignment_id, s.status, s.reviews_received, s.reviews_required
    );
}

fn print_review(r: &Review) {
    println!(
        "{:>6}  by user {}  {}/5  [{}]  {}",
        r.id, r.reviewer_id, r.rating, r.quality, r.feedback
    );
}

fn report_resolution(json: bool, request: &SyncRequest) -> Result<()> {
    if json {
        print_json(request)?;
    } else {
        println!("Sync request {} is now {}", request.id, request.status);
    }
    Ok(())
}
