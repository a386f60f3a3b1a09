mod api;
mod config;
mod error;
mod forms;
mod models;
mod session;
mod storage;
mod tui;
mod validation;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fmt::Display;

use api::{ApiClient, HttpTransport};
use config::Config;
use error::ApiError;
use forms::{
    InterviewForm, LoginForm, PasswordForm, PlacementForm, ProfileForm, SelectionForm, SignupForm,
    StudentRow, UpdateForm,
};
use models::{display_date, display_datetime, Placement, PlacementStatus, Role};
use session::Session;
use storage::LocalStore;
use validation::{parse_date, FieldErrors, FORM_KEY};

type AppSession = Session<HttpTransport>;

#[derive(Parser)]
#[command(name = "tnp")]
#[command(about = "Training and placement portal - placements, updates, interviews, selections")]
struct Cli {
    /// Backend base URL (overrides TNP_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log requests and session changes to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account and log in
    Signup {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Roll number
        #[arg(short, long)]
        rollno: String,

        /// student or admin
        #[arg(long, default_value = "student")]
        role: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Browse and manage placement drives
    Placements {
        #[command(subcommand)]
        command: PlacementCommands,
    },

    /// Post announcements on a placement
    Updates {
        #[command(subcommand)]
        command: UpdateCommands,
    },

    /// Interview rounds of a placement
    Interviews {
        #[command(subcommand)]
        command: InterviewCommands,
    },

    /// Selected students of a placement
    Selections {
        #[command(subcommand)]
        command: SelectionCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Change name and/or email
    Update {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,
    },

    /// Change password
    Password {
        /// Current password
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },
}

#[derive(Subcommand)]
enum PlacementCommands {
    /// List placements
    List {
        /// Filter by status (upcoming, ongoing, completed)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Show one placement with its updates
    Show {
        #[arg(value_parser = record_id)]
        id: String,
    },

    /// Create a placement (admin)
    Add {
        #[command(flatten)]
        fields: PlacementArgs,
    },

    /// Edit a placement; omitted fields keep their current value (admin)
    Edit {
        #[arg(value_parser = record_id)]
        id: String,

        #[command(flatten)]
        fields: PlacementArgs,
    },

    /// Delete a placement (admin)
    Delete {
        #[arg(value_parser = record_id)]
        id: String,
    },

    /// Interactive two-pane browser
    Browse,
}

#[derive(Args, Default)]
struct PlacementArgs {
    #[arg(long)]
    title: Option<String>,

    /// Comma-separated, e.g. "2025, 2026"
    #[arg(long)]
    batches: Option<String>,

    #[arg(long)]
    company: Option<String>,

    #[arg(long)]
    company_description: Option<String>,

    #[arg(long)]
    company_website: Option<String>,

    #[arg(long)]
    designation: Option<String>,

    #[arg(long)]
    jd_link: Option<String>,

    /// Comma-separated, e.g. "CSE, ECE"
    #[arg(long)]
    branches: Option<String>,

    #[arg(long)]
    active_backlogs: Option<String>,

    #[arg(long)]
    dead_backlogs: Option<String>,

    /// Comma-separated
    #[arg(long)]
    other_eligibilities: Option<String>,

    #[arg(long)]
    ctc: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    mode: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    drive_date: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    deadline: Option<String>,

    /// Comma-separated selection rounds
    #[arg(long)]
    rounds: Option<String>,

    #[arg(long)]
    registration_link: Option<String>,

    /// Repeat for several notes
    #[arg(long = "note")]
    notes: Vec<String>,

    #[arg(long)]
    details: Option<String>,

    /// upcoming, ongoing or completed
    #[arg(long)]
    status: Option<String>,
}

#[derive(Subcommand)]
enum UpdateCommands {
    /// Post an update (admin)
    Add {
        #[arg(value_parser = record_id)]
        placement_id: String,

        /// info, alert or reminder
        #[arg(short = 't', long = "type")]
        update_type: String,

        #[arg(short, long)]
        message: String,
    },

    /// Replace an update's type and message (admin)
    Edit {
        #[arg(value_parser = record_id)]
        placement_id: String,
        #[arg(value_parser = record_id)]
        update_id: String,

        #[arg(short = 't', long = "type")]
        update_type: String,

        #[arg(short, long)]
        message: String,
    },

    /// Remove an update (admin)
    Delete {
        #[arg(value_parser = record_id)]
        placement_id: String,
        #[arg(value_parser = record_id)]
        update_id: String,
    },
}

#[derive(Subcommand)]
enum InterviewCommands {
    /// List interview rounds of a placement
    List {
        #[arg(value_parser = record_id)]
        placement_id: String,
    },

    /// Schedule an interview round (admin)
    Add {
        #[arg(value_parser = record_id)]
        placement_id: String,

        #[command(flatten)]
        fields: InterviewArgs,
    },

    /// Edit an interview round; omitted fields keep their value (admin)
    Edit {
        #[arg(value_parser = record_id)]
        placement_id: String,
        #[arg(value_parser = record_id)]
        interview_id: String,

        #[command(flatten)]
        fields: InterviewArgs,
    },

    /// Remove an interview round (admin)
    Delete {
        #[arg(value_parser = record_id)]
        interview_id: String,
    },
}

#[derive(Args, Default)]
struct InterviewArgs {
    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    end: Option<String>,

    /// Online or Offline
    #[arg(long)]
    mode: Option<String>,

    #[arg(long)]
    meeting_link: Option<String>,

    #[arg(long)]
    shortlist_doc: Option<String>,

    #[arg(long = "note")]
    notes: Vec<String>,
}

#[derive(Subcommand)]
enum SelectionCommands {
    /// List selection records of a placement
    List {
        #[arg(value_parser = record_id)]
        placement_id: String,
    },

    /// Record selected students (admin)
    Add {
        #[arg(value_parser = record_id)]
        placement_id: String,

        #[command(flatten)]
        fields: SelectionArgs,
    },

    /// Replace a selection record; omitted fields keep their value (admin)
    Edit {
        #[arg(value_parser = record_id)]
        placement_id: String,
        #[arg(value_parser = record_id)]
        selection_id: String,

        #[command(flatten)]
        fields: SelectionArgs,
    },

    /// Remove a selection record (admin)
    Delete {
        #[arg(value_parser = record_id)]
        selection_id: String,
    },
}

#[derive(Args, Default)]
struct SelectionArgs {
    /// "name, rollno, branch"; repeat per student
    #[arg(long = "student")]
    students: Vec<String>,

    #[arg(long = "next-step")]
    next_steps: Vec<String>,

    #[arg(long)]
    document_link: Option<String>,

    #[arg(long = "note")]
    notes: Vec<String>,
}

/// Ids go straight into request paths, so a blank one is refused at parse time.
fn record_id(raw: &str) -> std::result::Result<String, String> {
    let id = raw.trim();
    if id.is_empty() {
        return Err("id cannot be blank".to_string());
    }
    Ok(id.to_string())
}

/// Render an error the way the command should report it: field-by-field for
/// rejected input, otherwise the backend message or the command's fallback.
fn describe(err: &ApiError, fallback: &str) -> String {
    match err {
        ApiError::Validation(errors) => {
            let mut out = String::from("Please fix the following:");
            for (field, message) in errors.iter() {
                if field == FORM_KEY {
                    out.push_str(&format!("\n  {}", message));
                } else {
                    out.push_str(&format!("\n  {}: {}", field, message));
                }
            }
            out
        }
        other => other.user_message(fallback),
    }
}

trait OrSay<T> {
    /// Turn a typed failure into the user-facing message for this command.
    fn or_say(self, fallback: &str) -> Result<T>;
}

impl<T, E: Into<ApiError>> OrSay<T> for std::result::Result<T, E> {
    fn or_say(self, fallback: &str) -> Result<T> {
        self.map_err(|e| {
            let err: ApiError = e.into();
            tracing::debug!(error = %err, "command failed");
            anyhow!(describe(&err, fallback))
        })
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_session(cli_api_url: Option<&str>) -> Result<AppSession> {
    let mut config = Config::from_env();
    if let Some(url) = cli_api_url {
        config = config.with_api_url(url);
    }
    tracing::debug!(api_url = %config.api_url, "config loaded");

    let store = LocalStore::open(&config.store_path())
        .with_context(|| format!("Failed to open local store at {}", config.store_path().display()))?;
    tracing::debug!(store = ?store.path(), "local store opened");
    let transport = HttpTransport::new(&config).or_say("Failed to set up HTTP client.")?;
    Session::init(ApiClient::new(transport), store).or_say("Failed to restore session.")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut session = open_session(cli.api_url.as_deref())?;

    match cli.command {
        Commands::Login { email, password } => {
            let user = session
                .login(LoginForm { email, password })
                .or_say("Login failed. Please check your credentials.")?;
            println!("Logged in as {} ({})", user.name, user.role);
        }

        Commands::Signup { name, email, password, rollno, role } => {
            let role: Role = role.parse().map_err(|e: String| anyhow!(e))?;
            let user = session
                .signup(SignupForm { name, email, password, rollno, role })
                .or_say("Signup failed. Please try again.")?;
            println!("Account created. Logged in as {} ({})", user.name, user.role);
        }

        Commands::Logout => {
            if !session.is_authenticated() && session.token().is_none() {
                println!("Not logged in.");
                return Ok(());
            }
            let email = session.user().map(|u| u.email.clone());
            session.logout().or_say("Failed to log out.")?;
            match email {
                Some(email) => println!("Logged out {}.", email),
                None => println!("Logged out."),
            }
        }

        Commands::Whoami => {
            let user = session.require_auth().or_say("Not logged in.")?;
            println!("Name:    {}", user.name);
            println!("Email:   {}", user.email);
            if !user.rollno.is_empty() {
                println!("Roll no: {}", user.rollno);
            }
            println!("Role:    {}", user.role);
            if session.is_admin() {
                println!("Admin commands are available.");
            }
        }

        Commands::Profile { command } => run_profile(&mut session, command)?,
        Commands::Placements { command } => run_placements(&session, command)?,
        Commands::Updates { command } => run_updates(&session, command)?,
        Commands::Interviews { command } => run_interviews(&session, command)?,
        Commands::Selections { command } => run_selections(&session, command)?,
    }

    Ok(())
}

fn run_profile(session: &mut AppSession, command: ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::Update { name, email } => {
            let current = session.require_auth().or_say("Failed to update profile.")?;
            let form = ProfileForm {
                name: name.unwrap_or_else(|| current.name.clone()),
                email: email.unwrap_or_else(|| current.email.clone()),
            };
            let user = session.update_profile(form).or_say("Failed to update profile.")?;
            println!("Profile updated: {} <{}>", user.name, user.email);
        }

        ProfileCommands::Password { current, new } => {
            session
                .change_password(PasswordForm { password: current, new_password: new })
                .or_say("Failed to change password.")?;
            println!("Password changed.");
        }
    }
    Ok(())
}

fn run_placements(session: &AppSession, command: PlacementCommands) -> Result<()> {
    let client = session.client();
    match command {
        PlacementCommands::List { status } => {
            session.require_auth().or_say("Failed to load placements.")?;
            let status = status
                .map(|s| s.parse::<PlacementStatus>())
                .transpose()
                .map_err(|e| anyhow!(e))?;
            let placements: Vec<Placement> = client
                .list_placements()
                .or_say("Could not load placements.")?
                .into_iter()
                .filter(|p| status.is_none_or(|s| p.status.unwrap_or_default() == s))
                .collect();

            if placements.is_empty() {
                println!("No placements found.");
            } else {
                println!("{:<26} {:<10} {:<30} {:<20} {:>12}", "ID", "STATUS", "TITLE", "COMPANY", "DEADLINE");
                println!("{}", "-".repeat(102));
                for p in placements {
                    println!(
                        "{:<26} {:<10} {:<30} {:<20} {:>12}",
                        p.id,
                        p.status.unwrap_or_default(),
                        truncate(&p.title, 28),
                        truncate(&p.company.name, 18),
                        p.application_deadline.as_deref().map(display_date).unwrap_or_else(|| "-".into())
                    );
                }
            }
        }

        PlacementCommands::Show { id } => {
            session.require_auth().or_say("Could not load placement data.")?;
            let p = client.get_placement(&id).or_say("Could not load placement data.")?;
            print_placement(&p);
        }

        PlacementCommands::Add { fields } => {
            session.require_admin().or_say("Failed to add placement.")?;
            let mut form = PlacementForm::default();
            fields.apply(&mut form).or_say("Failed to add placement.")?;
            let payload = form.validate_new(chrono::Local::now()).or_say("Failed to add placement.")?;
            let resp = client.create_placement(&payload).or_say("Failed to add placement.")?;
            match resp.placement {
                Some(p) => println!("Added placement {} ({})", p.title, p.id),
                None => println!("{}", resp.message.unwrap_or_else(|| "Placement added.".into())),
            }
        }

        PlacementCommands::Edit { id, fields } => {
            session.require_admin().or_say("Failed to update placement.")?;
            let current = client.get_placement(&id).or_say("Could not load placement data.")?;
            let mut form = PlacementForm::from_placement(&current);
            fields.apply(&mut form).or_say("Failed to update placement.")?;
            let payload = form.validate_edit().or_say("Failed to update placement.")?;
            client.update_placement(&id, &payload).or_say("Failed to update placement.")?;
            let refreshed = client.get_placement(&id).or_say("Could not load placement data.")?;
            println!("Updated placement {} ({})", refreshed.title, refreshed.id);
        }

        PlacementCommands::Delete { id } => {
            session.require_admin().or_say("Failed to delete placement.")?;
            let resp = client.delete_placement(&id).or_say("Failed to delete placement.")?;
            println!("{}", resp.message.unwrap_or_else(|| format!("Deleted placement {}.", id)));
        }

        PlacementCommands::Browse => {
            session.require_auth().or_say("Could not load placements.")?;
            tui::run_browse(client)?;
        }
    }
    Ok(())
}

fn run_updates(session: &AppSession, command: UpdateCommands) -> Result<()> {
    let client = session.client();
    session.require_admin().or_say("Failed to save update.")?;
    let (placement_id, verb) = match command {
        UpdateCommands::Add { placement_id, update_type, message } => {
            let payload = UpdateForm { update_type, message }.validate().or_say("Failed to add update.")?;
            client.add_placement_update(&placement_id, &payload).or_say("Failed to add update.")?;
            (placement_id, "added")
        }

        UpdateCommands::Edit { placement_id, update_id, update_type, message } => {
            let payload = UpdateForm { update_type, message }.validate().or_say("Failed to edit update.")?;
            client
                .edit_placement_update(&placement_id, &update_id, &payload)
                .or_say("Failed to edit update.")?;
            (placement_id, "edited")
        }

        UpdateCommands::Delete { placement_id, update_id } => {
            client
                .delete_placement_update(&placement_id, &update_id)
                .or_say("Failed to delete update.")?;
            (placement_id, "deleted")
        }
    };

    // Mutation responses are not trusted; show the feed as the backend now has it.
    let p = client.get_placement(&placement_id).or_say("Could not load placement data.")?;
    println!("Update {}. {} now has {} update(s):", verb, p.title, p.updates.len());
    print_updates(&p);
    Ok(())
}

fn run_interviews(session: &AppSession, command: InterviewCommands) -> Result<()> {
    let client = session.client();
    match command {
        InterviewCommands::List { placement_id } => {
            session.require_auth().or_say("Failed to load interviews.")?;
            let interviews = client.list_interviews(&placement_id).or_say("Failed to load interviews.")?;
            if interviews.is_empty() {
                println!("No interviews scheduled.");
            } else {
                println!("{:<26} {:<12} {:<20} {:<10} {}", "ID", "DATE", "TIME", "MODE", "LINK");
                println!("{}", "-".repeat(90));
                for iv in interviews {
                    let d = &iv.details;
                    println!(
                        "{:<26} {:<12} {:<20} {:<10} {}",
                        iv.id,
                        display_date(&d.interview_date),
                        truncate(&format!("{}-{}", d.start_time, d.end_time), 18),
                        truncate(&d.mode, 8),
                        d.meeting_link.as_deref().unwrap_or("-")
                    );
                    for note in &d.additional_notes {
                        println!("    - {}", note);
                    }
                }
            }
        }

        InterviewCommands::Add { placement_id, fields } => {
            session.require_admin().or_say("Failed to add interview.")?;
            let mut form = InterviewForm::default();
            fields.apply(&mut form);
            let data = form.validate().or_say("Failed to add interview.")?;
            let iv = client.add_interview(&placement_id, &data).or_say("Failed to add interview.")?;
            println!("Scheduled interview {} on {}", iv.id, display_date(&iv.details.interview_date));
        }

        InterviewCommands::Edit { placement_id, interview_id, fields } => {
            session.require_admin().or_say("Failed to update interview.")?;
            let current = client
                .list_interviews(&placement_id)
                .or_say("Failed to load interviews.")?
                .into_iter()
                .find(|iv| iv.id == interview_id)
                .ok_or_else(|| anyhow!("Interview {} not found for placement {}.", interview_id, placement_id))?;
            let mut form = InterviewForm::from_interview(&current);
            fields.apply(&mut form);
            let data = form.validate().or_say("Failed to update interview.")?;
            let iv = client.update_interview(&interview_id, &data).or_say("Failed to update interview.")?;
            println!("Updated interview {} ({})", iv.id, display_date(&iv.details.interview_date));
        }

        InterviewCommands::Delete { interview_id } => {
            session.require_admin().or_say("Failed to delete interview.")?;
            let resp = client.delete_interview(&interview_id).or_say("Failed to delete interview.")?;
            println!("{}", resp.message.unwrap_or_else(|| "Interview deleted.".into()));
        }
    }
    Ok(())
}

fn run_selections(session: &AppSession, command: SelectionCommands) -> Result<()> {
    let client = session.client();
    match command {
        SelectionCommands::List { placement_id } => {
            session.require_auth().or_say("Failed to load selections.")?;
            let records = client.list_selections(&placement_id).or_say("Failed to load selections.")?;
            if records.is_empty() {
                println!("No selections announced.");
            }
            for record in records {
                println!("Selection {}", record.id);
                println!("{:<4} {:<28} {:<14} {:<10}", "#", "NAME", "ROLL NO", "BRANCH");
                for (i, s) in record.data.selected_students.iter().enumerate() {
                    println!("{:<4} {:<28} {:<14} {:<10}", i + 1, truncate(&s.name, 26), s.rollno, s.branch);
                }
                if !record.data.next_steps.is_empty() {
                    println!("Next steps:");
                    for step in &record.data.next_steps {
                        println!("  - {}", step);
                    }
                }
                if let Some(link) = &record.data.document_link {
                    println!("Document: {}", link);
                }
                for note in &record.data.additional_notes {
                    println!("Note: {}", note);
                }
                println!();
            }
        }

        SelectionCommands::Add { placement_id, fields } => {
            session.require_admin().or_say("Failed to add selection.")?;
            let mut form = SelectionForm::default();
            fields.apply(&mut form);
            let Some(data) = form.validate().or_say("Failed to add selection.")? else {
                println!("No students entered; nothing to submit.");
                return Ok(());
            };
            let record = client.add_selection(&placement_id, &data).or_say("Failed to add selection.")?;
            println!(
                "Recorded selection {} with {} student(s).",
                record.id,
                record.data.selected_students.len()
            );
        }

        SelectionCommands::Edit { placement_id, selection_id, fields } => {
            session.require_admin().or_say("Failed to update selection.")?;
            let current = client
                .list_selections(&placement_id)
                .or_say("Failed to load selections.")?
                .into_iter()
                .find(|r| r.id == selection_id)
                .ok_or_else(|| anyhow!("Selection {} not found for placement {}.", selection_id, placement_id))?;
            let mut form = SelectionForm::from_record(&current);
            fields.apply(&mut form);
            let Some(data) = form.validate().or_say("Failed to update selection.")? else {
                println!("No students entered; nothing to submit.");
                return Ok(());
            };
            let record = client.update_selection(&selection_id, &data).or_say("Failed to update selection.")?;
            println!(
                "Updated selection {} ({} student(s)).",
                record.id,
                record.data.selected_students.len()
            );
        }

        SelectionCommands::Delete { selection_id } => {
            session.require_admin().or_say("Failed to delete selection.")?;
            let resp = client.delete_selection(&selection_id).or_say("Failed to delete selection.")?;
            println!("{}", resp.message.unwrap_or_else(|| "Selection deleted.".into()));
        }
    }
    Ok(())
}

impl PlacementArgs {
    /// Overlay the given flags onto `form`. Dates and status are parsed here so
    /// a typo is reported alongside the other field errors.
    fn apply(self, form: &mut PlacementForm) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        set(&mut form.title, self.title);
        set(&mut form.batches, self.batches);
        set(&mut form.company_name, self.company);
        set(&mut form.company_description, self.company_description);
        set(&mut form.company_website, self.company_website);
        set(&mut form.job_designation, self.designation);
        set(&mut form.job_description_link, self.jd_link);
        set(&mut form.eligible_branches, self.branches);
        set(&mut form.active_backlogs, self.active_backlogs);
        set(&mut form.dead_backlogs, self.dead_backlogs);
        set(&mut form.other_eligibilities, self.other_eligibilities);
        set(&mut form.ctc_details, self.ctc);
        set(&mut form.location, self.location);
        set(&mut form.mode_of_recruitment, self.mode);
        set(&mut form.selection_process, self.rounds);
        set(&mut form.registration_link, self.registration_link);
        set(&mut form.additional_details, self.details);
        if !self.notes.is_empty() {
            form.notes = self.notes.join("\n");
        }

        for (field, value, target) in [
            ("tentativeDriveDate", self.drive_date, &mut form.tentative_drive_date),
            ("applicationDeadline", self.deadline, &mut form.application_deadline),
        ] {
            match value.as_deref().map(str::trim) {
                None => {}
                Some("") => *target = None,
                Some(raw) => match parse_date(raw) {
                    Some(date) => *target = Some(date),
                    None => errors.add(field, "Invalid date. Use YYYY-MM-DD."),
                },
            }
        }

        if let Some(status) = self.status {
            match status.parse::<PlacementStatus>() {
                Ok(s) => form.status = s,
                Err(msg) => errors.add("status", msg),
            }
        }
        errors.into_result(())
    }
}

impl InterviewArgs {
    fn apply(self, form: &mut InterviewForm) {
        set(&mut form.interview_date, self.date);
        set(&mut form.start_time, self.start);
        set(&mut form.end_time, self.end);
        set(&mut form.mode, self.mode);
        set(&mut form.meeting_link, self.meeting_link);
        set(&mut form.shortlisted_students_doc, self.shortlist_doc);
        if !self.notes.is_empty() {
            form.additional_notes = self.notes.join("\n");
        }
    }
}

impl SelectionArgs {
    fn apply(self, form: &mut SelectionForm) {
        if !self.students.is_empty() {
            form.students = self.students.iter().map(|s| StudentRow::parse(s)).collect();
        }
        if !self.next_steps.is_empty() {
            form.next_steps = self.next_steps.join("\n");
        }
        set(&mut form.document_link, self.document_link);
        if !self.notes.is_empty() {
            form.additional_notes = self.notes.join("\n");
        }
    }
}

fn set(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v;
    }
}

fn print_placement(p: &Placement) {
    println!("Placement {}", p.id);
    println!("Title: {}", p.title);
    println!("Company: {}", p.company.name);
    print_opt("Website", p.company.website.as_deref());
    print_opt("About", p.company.description.as_deref());
    println!("Designation: {}", p.job_designation);
    print_opt("JD", p.job_description_link.as_deref());
    println!("Status: {}", p.status.unwrap_or_default());
    println!("CTC: {}", p.ctc_details);
    print_list("Batches", &p.batches);
    print_list("Branches", &p.eligible_branches);
    let criteria = &p.eligibility_criteria;
    print_opt("Active backlogs", criteria.active_backlogs.as_deref());
    print_opt("Dead backlogs", criteria.dead_backlogs.as_deref());
    if let Some(other) = &criteria.other_eligibilities {
        print_list("Other eligibility", other);
    }
    print_opt("Location", p.location.as_deref());
    print_opt("Mode", p.mode_of_recruitment.as_deref());
    print_opt("Drive date", p.tentative_drive_date.as_deref().map(display_date).as_deref());
    print_opt("Deadline", p.application_deadline.as_deref().map(display_date).as_deref());
    print_list("Rounds", &p.drive_rounds);
    print_opt("Apply", p.apply_link.as_deref());
    if !p.notes.is_empty() {
        println!("Notes:");
        for note in &p.notes {
            println!("  - {}", note);
        }
    }
    if let Some(details) = &p.additional_details {
        println!("\n--- Additional Details ---\n{}", details);
    }
    println!("\nUpdates ({}):", p.updates.len());
    print_updates(p);
}

fn print_updates(p: &Placement) {
    if p.updates.is_empty() {
        println!("  No updates yet.");
    }
    for u in &p.updates {
        let when = u.created_at.as_deref().map(display_datetime).unwrap_or_default();
        println!("  [{}] {:<9} {} {}", u.id, u.update_type, when, u.message);
    }
}

fn print_opt(label: &str, value: Option<impl Display>) {
    if let Some(v) = value {
        println!("{}: {}", label, v);
    }
}

fn print_list(label: &str, values: &[String]) {
    if !values.is_empty() {
        println!("{}: {}", label, values.join(", "));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
