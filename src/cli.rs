//! Command-line front end.
//!
//! Each subcommand is one screen action. The add-medication wizard spans
//! several invocations, so its draft list is kept in the scratch file
//! between them; the login is kept in the session file.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use crate::api::{self, ApiClient, ApiError, Backend, MedicationRepository, MedicationsApi};
use crate::catalog::{Catalog, MIN_QUERY_CHARS};
use crate::config::{self, ApiConfig, ConfigError};
use crate::dosing::{self, DoseEdit, DosingError, FrequencyPreset, MAX_DAILY_DOSES};
use crate::editing::{EditError, MedicationEditor};
use crate::models::{
    clock, AgendaEntry, Appointment, Credentials, Doctor, Dose, MealRelation, Medication,
    ModelError, Presentation, RecordId, Registration, User,
};
use crate::schedule::{self, Reminder, ScheduleError};
use crate::session::{Session, SessionError};
use crate::tasks::ViewScope;
use crate::wizard::{AddMedicationFlow, ScratchError, ScratchFile, WizardError};

// ═══════════════════════════════════════════════════════════
// Arguments
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Parser)]
#[command(
    name = "misalud",
    version,
    about = "MiSalud medication reminders from the command line",
    long_about = "misalud keeps your medications, doses, doctors, appointments and notes \
        on the MiSalud backend.\n\n\
        EXAMPLES:\n\
        \n  misalud login --email ana@example.com --password secreto\
        \n  misalud add start Ibuprofeno Pastillas\
        \n  misalud add frequency 2\
        \n  misalud add dose 2 --time 21:30\
        \n  misalud add submit\
        \n  misalud today"
)]
pub struct Cli {
    /// Backend base URL (overrides MISALUD_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory holding the saved session and in-progress drafts
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login(LoginArgs),
    /// Forget the saved session
    Logout,
    /// Create a new account
    Register(RegisterArgs),
    /// Show who is signed in
    Whoami,
    /// Saved medications
    Meds {
        #[command(subcommand)]
        command: MedsCommand,
    },
    /// Add a medication step by step
    Add {
        #[command(subcommand)]
        command: AddCommand,
    },
    /// Search the bundled medication catalog
    Search {
        /// At least three letters of the name
        query: String,
    },
    /// Today's reminders and refill warnings
    Today,
    /// Your doctors
    Doctors {
        #[command(subcommand)]
        command: DoctorsCommand,
    },
    /// Personal notes
    Agenda {
        #[command(subcommand)]
        command: AgendaCommand,
    },
    /// Medical appointments
    Appointments {
        #[command(subcommand)]
        command: AppointmentsCommand,
    },
    /// Your account
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub birth_date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    pub sex: String,
}

/// Field changes for one dose. At least one flag is required.
#[derive(Debug, Args, Clone, Default)]
pub struct DoseEditArgs {
    /// New time, e.g. 21:30 or "9:30 p.m."
    #[arg(long)]
    pub time: Option<String>,
    /// New quantity; anything but a whole number counts as 0
    #[arg(long)]
    pub quantity: Option<String>,
    /// antes, durante, después or none
    #[arg(long)]
    pub meal: Option<String>,
}

/// A whole one-, two- or three-dose layout, in dose order. Quantities and
/// meal relations pair up with the times by position.
#[derive(Debug, Args, Clone, Default)]
pub struct FixedDosesArgs {
    /// Dose time, repeated once per dose
    #[arg(long = "time", value_name = "TIME", required = true)]
    pub times: Vec<String>,
    /// Quantity for the dose at the same position (default 1)
    #[arg(long = "quantity", value_name = "QTY")]
    pub quantities: Vec<String>,
    /// Meal relation for the dose at the same position (default antes)
    #[arg(long = "meal", value_name = "MEAL")]
    pub meals: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum MedsCommand {
    List,
    Show {
        id: RecordId,
    },
    Delete {
        id: RecordId,
    },
    /// Rename a medication and optionally change its unit
    Rename {
        id: RecordId,
        name: String,
        #[arg(long)]
        unit: Option<String>,
    },
    /// Replace the doses numbered 1..=N with a fixed layout
    SetDoses {
        id: RecordId,
        #[command(flatten)]
        layout: FixedDosesArgs,
    },
    /// Change how many doses per day (1 to 3)
    SetFrequency {
        id: RecordId,
        per_day: usize,
    },
    EditDose {
        id: RecordId,
        /// Dose position, starting at 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        dose: u32,
        #[command(flatten)]
        edit: DoseEditArgs,
    },
    /// Mark a dose as taken
    Take {
        id: RecordId,
        /// Dose number
        dose: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum AddCommand {
    /// Pick the medication and its presentation
    Start {
        name: String,
        #[arg(default_value = "Pastillas")]
        presentation: String,
    },
    /// 1, 2, 3, as-needed, or a custom label
    Frequency { choice: String },
    /// Edit one dose of the draft
    Dose {
        /// Dose position, starting at 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        dose: u32,
        #[command(flatten)]
        edit: DoseEditArgs,
    },
    /// Enter every dose of the draft at once
    Doses(FixedDosesArgs),
    /// Stock left and the level that should trigger a refill
    Refill {
        remaining: u32,
        min: u32,
        #[arg(long)]
        total: Option<u32>,
    },
    /// Free-text instructions
    Notes { text: String },
    /// Save the medication
    Submit,
    /// Throw the draft away
    Cancel,
    /// Show the draft
    Show,
}

#[derive(Debug, Subcommand)]
pub enum DoctorsCommand {
    List,
    Add(DoctorArgs),
    Show { id: RecordId },
    Delete { id: RecordId },
}

#[derive(Debug, Args)]
pub struct DoctorArgs {
    pub name: String,
    #[arg(default_value = "")]
    pub specialty: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub office_phone: String,
    #[arg(long, default_value = "")]
    pub mobile_phone: String,
    #[arg(long, default_value = "")]
    pub emergency_phone: String,
}

#[derive(Debug, Subcommand)]
pub enum AgendaCommand {
    List,
    /// Write a note; its first words become the title
    Add {
        note: String,
        #[arg(long)]
        kind: Option<String>,
        /// RFC 3339 timestamp, defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    Show {
        id: RecordId,
    },
    Delete {
        id: RecordId,
    },
}

#[derive(Debug, Subcommand)]
pub enum AppointmentsCommand {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "")]
        note: String,
    },
    Delete {
        id: RecordId,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    Show,
    Update(AccountUpdateArgs),
    /// Delete the account and forget the session
    Delete {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct AccountUpdateArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub sex: Option<String>,
    #[arg(long)]
    pub birth_date: Option<NaiveDate>,
    /// Sent only when given
    #[arg(long)]
    pub password: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Scratch(#[from] ScratchError),

    #[error(transparent)]
    Invalid(#[from] ModelError),

    #[error(transparent)]
    Dosing(#[from] DosingError),

    #[error("Bundled catalog is unreadable: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("A submission is already in progress")]
    Busy,

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Account deletion needs --yes")]
    NotConfirmed,
}

impl CliError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Api(e) => e.user_message(),
            Self::Wizard(e) => e.user_message(),
            Self::Edit(e) => e.user_message(),
            Self::Schedule(e) => e.to_string(),
            Self::Scratch(_) => "Your in-progress medication could not be read or saved.".into(),
            Self::Invalid(e) => e.to_string(),
            Self::Dosing(e) => e.to_string(),
            Self::Catalog(_) => "The medication catalog is unavailable.".into(),
            Self::Busy => "Already saving, please wait.".into(),
            Self::Cancelled => "The request was cancelled.".into(),
            Self::NotConfirmed => "Add --yes to confirm deleting your account.".into(),
        }
    }
}

impl DoseEditArgs {
    pub fn edits(&self) -> Result<Vec<DoseEdit>, CliError> {
        let mut edits = Vec::new();
        if let Some(raw) = &self.time {
            let time = clock::parse_clock(raw).ok_or_else(|| DosingError::InvalidTime(raw.clone()))?;
            edits.push(DoseEdit::Time(time));
        }
        if let Some(raw) = &self.quantity {
            edits.push(DoseEdit::quantity_text(raw));
        }
        if let Some(raw) = &self.meal {
            edits.push(DoseEdit::MealRelation(parse_meal(raw)?));
        }
        if edits.is_empty() {
            return Err(ModelError::MissingField("--time, --quantity or --meal").into());
        }
        Ok(edits)
    }
}

impl FixedDosesArgs {
    pub fn doses(&self) -> Result<Vec<Dose>, CliError> {
        if self.times.len() > MAX_DAILY_DOSES {
            return Err(DosingError::UnsupportedCount(self.times.len()).into());
        }
        self.times
            .iter()
            .enumerate()
            .map(|(i, raw)| -> Result<Dose, CliError> {
                let time = clock::parse_clock(raw).ok_or_else(|| DosingError::InvalidTime(raw.clone()))?;
                let quantity = self
                    .quantities
                    .get(i)
                    .map_or(1, |q| dosing::parse_quantity(q));
                let meal = match self.meals.get(i) {
                    Some(raw) => parse_meal(raw)?,
                    None => Some(MealRelation::Before),
                };
                Ok(Dose::new(i as u32 + 1, time, quantity, meal))
            })
            .collect()
    }
}

fn parse_meal(raw: &str) -> Result<Option<MealRelation>, ModelError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    MealRelation::parse_loose(trimmed)
        .map(Some)
        .ok_or_else(|| ModelError::InvalidEnum {
            field: "momento_comida".into(),
            value: trimmed.to_string(),
        })
}

// ═══════════════════════════════════════════════════════════
// Context
// ═══════════════════════════════════════════════════════════

struct Context {
    api: ApiConfig,
    data_dir: PathBuf,
}

impl Context {
    fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut api = ApiConfig::from_env()?;
        if let Some(url) = &cli.api_url {
            api = ApiConfig::new(url, api.timeout.as_secs());
        }
        Ok(Self {
            api,
            data_dir: cli.data_dir.clone().unwrap_or_else(config::app_data_dir),
        })
    }

    fn client(&self) -> Result<ApiClient, CliError> {
        Ok(ApiClient::new(&self.api)?)
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(config::SESSION_FILE)
    }

    fn scratch(&self) -> ScratchFile {
        ScratchFile::new(self.data_dir.join(config::SCRATCH_FILE))
    }

    fn backend(&self) -> Result<Backend, CliError> {
        let session = Session::load(&self.session_path())
            .map_err(ApiError::from)?
            .ok_or(ApiError::Session(SessionError::MissingToken))?;
        Ok(Backend::new(self.client()?, session))
    }

    /// Run one wizard step against the scratch file.
    fn with_flow(
        &self,
        step: impl FnOnce(&mut AddMedicationFlow) -> Result<(), WizardError>,
    ) -> Result<(), CliError> {
        let scratch = self.scratch();
        let mut flow = AddMedicationFlow::resume(scratch.load()?);
        step(&mut flow)?;
        scratch.save(flow.book())?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Dispatch
// ═══════════════════════════════════════════════════════════

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::from_cli(&cli)?;
    tracing::debug!(base_url = %ctx.api.base_url, data_dir = %ctx.data_dir.display(), "CLI context");

    match cli.command {
        Command::Login(args) => login(&ctx, args).await,
        Command::Logout => {
            Session::remove(&ctx.session_path()).map_err(ApiError::from)?;
            println!("Signed out.");
            Ok(())
        }
        Command::Register(args) => register(&ctx, args).await,
        Command::Whoami => {
            let backend = ctx.backend()?;
            let user = backend.session().user();
            println!("{} (id {})", user.user_name, user.user_id);
            Ok(())
        }
        Command::Meds { command } => meds(&ctx, command).await,
        Command::Add { command } => add(&ctx, command).await,
        Command::Search { query } => search(&query),
        Command::Today => today(&ctx).await,
        Command::Doctors { command } => doctors(&ctx, command).await,
        Command::Agenda { command } => agenda(&ctx, command).await,
        Command::Appointments { command } => appointments(&ctx, command).await,
        Command::Account { command } => account(&ctx, command).await,
    }
}

async fn login(ctx: &Context, args: LoginArgs) -> Result<(), CliError> {
    let client = ctx.client()?;
    let credentials = Credentials {
        email: args.email,
        password: args.password,
    };
    let session = api::auth::login(&client, &credentials).await?;
    session.save(&ctx.session_path()).map_err(ApiError::from)?;
    println!("Signed in as {}.", session.user().user_name);
    Ok(())
}

async fn register(ctx: &Context, args: RegisterArgs) -> Result<(), CliError> {
    let client = ctx.client()?;
    let registration = Registration {
        user: User {
            id: None,
            first_name: args.first_name,
            last_name: args.last_name,
            birth_date: args.birth_date,
            sex: args.sex,
            email: args.email,
            password: None,
        },
        password: args.password,
        confirm_password: args.confirm_password,
    };
    let user = api::auth::register(&client, registration).await?;
    println!("Account created for {}. You can now log in.", user.email);
    Ok(())
}

async fn meds(ctx: &Context, command: MedsCommand) -> Result<(), CliError> {
    let backend = ctx.backend()?;
    let repo = backend.medications();
    match command {
        MedsCommand::List => {
            let meds = repo.list().await?;
            if meds.is_empty() {
                println!("No medications yet.");
            }
            for med in &meds {
                println!("{}", render_medication(med));
            }
        }
        MedsCommand::Show { id } => {
            let med = repo.fetch_with_doses(&id).await?;
            println!("{}", render_medication_detail(&med));
        }
        MedsCommand::Delete { id } => {
            repo.delete(&id).await?;
            println!("Deleted medication {id}.");
        }
        MedsCommand::Rename { id, name, unit } => {
            let mut editor = MedicationEditor::load(&repo, &id).await?;
            editor.set_name(&name)?;
            if let Some(unit) = unit {
                editor.set_unit(&unit);
            }
            let saved = editor.save(&repo).await?;
            println!("{}", render_medication(saved));
        }
        MedsCommand::SetDoses { id, layout } => {
            let doses = layout.doses()?;
            let mut editor = MedicationEditor::load(&repo, &id).await?;
            editor.merge_doses(doses);
            let saved = editor.save(&repo).await?;
            println!("{}", render_medication_detail(saved));
        }
        MedsCommand::SetFrequency { id, per_day } => {
            let mut editor = MedicationEditor::load(&repo, &id).await?;
            let mut doses = editor.open_doses();
            doses.change_frequency(per_day)?;
            let (doses, label) = doses.finish();
            editor.apply_doses(doses);
            let saved = editor.save(&repo).await?;
            println!("{}: {label}", saved.name);
        }
        MedsCommand::EditDose { id, dose, edit } => {
            let edits = edit.edits()?;
            let mut editor = MedicationEditor::load(&repo, &id).await?;
            let mut doses = editor.open_doses();
            for change in edits {
                doses.edit(dose as usize - 1, change)?;
            }
            let (doses, _) = doses.finish();
            editor.apply_doses(doses);
            let saved = editor.save(&repo).await?;
            println!("{}", render_medication_detail(saved));
        }
        MedsCommand::Take { id, dose } => {
            let med = repo.fetch_with_doses(&id).await?;
            let updated = schedule::mark_administered(&med, dose)?;
            repo.update(&id, &updated).await?;
            println!("{}: dose {dose} marked as taken.", updated.name);
        }
    }
    Ok(())
}

async fn add(ctx: &Context, command: AddCommand) -> Result<(), CliError> {
    match command {
        AddCommand::Start { name, presentation } => ctx.with_flow(|flow| {
            let draft = flow.start(&name, Presentation::parse(&presentation))?;
            println!("{}", render_medication_detail(draft));
            Ok(())
        }),
        AddCommand::Frequency { choice } => ctx.with_flow(|flow| {
            let preset = FrequencyPreset::parse(&choice);
            let draft = flow.select_frequency(&preset)?;
            println!("{}", preset.label());
            println!("{}", render_medication_detail(draft));
            Ok(())
        }),
        AddCommand::Dose { dose, edit } => {
            let edits = edit.edits()?;
            ctx.with_flow(|flow| {
                for change in edits {
                    flow.edit_dose(dose as usize - 1, change)?;
                }
                if let Some(draft) = flow.current() {
                    println!("{}", render_medication_detail(draft));
                }
                Ok(())
            })
        }
        AddCommand::Doses(layout) => {
            let doses = layout.doses()?;
            ctx.with_flow(|flow| {
                let draft = flow.save_fixed_doses(doses)?;
                println!("{}", render_medication_detail(draft));
                Ok(())
            })
        }
        AddCommand::Refill {
            remaining,
            min,
            total,
        } => ctx.with_flow(|flow| {
            flow.set_refill(remaining, min, total)?;
            println!("Refill reminder at {min} units ({remaining} left).");
            Ok(())
        }),
        AddCommand::Notes { text } => ctx.with_flow(|flow| {
            flow.set_instructions(&text)?;
            println!("Instructions saved.");
            Ok(())
        }),
        AddCommand::Show => ctx.with_flow(|flow| {
            match flow.current() {
                Some(draft) => println!("{}", render_medication_detail(draft)),
                None => println!("No medication is being added."),
            }
            Ok(())
        }),
        AddCommand::Cancel => ctx.with_flow(|flow| {
            flow.cancel();
            println!("Draft discarded.");
            Ok(())
        }),
        AddCommand::Submit => submit(ctx).await,
    }
}

async fn submit(ctx: &Context) -> Result<(), CliError> {
    let backend = ctx.backend()?;
    let scratch = ctx.scratch();

    // Held until the POST finishes and the scratch list is cleared, so a
    // second `add submit` cannot send the same draft.
    let _lock = scratch.lock_submit()?.ok_or(CliError::Busy)?;
    let mut flow = AddMedicationFlow::resume(scratch.load()?);
    let created = flow.finalize(&backend.medications()).await?;
    scratch.save(flow.book())?;

    println!("Saved {} with {} doses.", created.name, created.doses.len());
    Ok(())
}

fn search(query: &str) -> Result<(), CliError> {
    if query.trim().chars().count() < MIN_QUERY_CHARS {
        println!("Type at least {MIN_QUERY_CHARS} letters.");
        return Ok(());
    }
    let catalog = Catalog::builtin()?;
    let hits = catalog.search(query);
    if hits.is_empty() {
        println!("No matches. Add it by name with `misalud add start`.");
    }
    for entry in hits {
        println!("{}  ({})", entry.name, entry.details());
    }
    Ok(())
}

async fn today(ctx: &Context) -> Result<(), CliError> {
    let backend = ctx.backend()?;
    let client = backend.client().clone();
    let session = backend.session().clone();

    // Ctrl-C closes the view: the request is aborted and its result dropped.
    let scope = ViewScope::new();
    let task = scope.spawn(async move { MedicationsApi::new(&client, &session).list().await });
    let meds = tokio::select! {
        result = task.result() => result.ok_or(CliError::Cancelled)??,
        _ = tokio::signal::ctrl_c() => {
            scope.close();
            return Err(CliError::Cancelled);
        }
    };

    let reminders = schedule::todays_reminders(&meds);
    if reminders.is_empty() {
        println!("Nothing scheduled for today.");
    }
    for reminder in &reminders {
        println!("{}", render_reminder(reminder));
    }
    for med in schedule::refill_alerts(&meds) {
        println!(
            "Refill {}: {} left (minimum {}).",
            med.name,
            med.remaining_units.unwrap_or(0),
            med.min_units.unwrap_or(0)
        );
    }
    Ok(())
}

async fn doctors(ctx: &Context, command: DoctorsCommand) -> Result<(), CliError> {
    let backend = ctx.backend()?;
    let api = backend.doctors();
    match command {
        DoctorsCommand::List => {
            for doctor in api.list().await? {
                println!("{}", render_doctor(&doctor));
            }
        }
        DoctorsCommand::Add(args) => {
            let mut doctor = Doctor::new(&args.name, &args.specialty);
            doctor.email = args.email;
            doctor.office_phone = args.office_phone;
            doctor.mobile_phone = args.mobile_phone;
            doctor.emergency_phone = args.emergency_phone;
            let created = api.create(&doctor).await?;
            println!("{}", render_doctor(&created));
        }
        DoctorsCommand::Show { id } => {
            let doctor = api.view(&id).await?;
            println!("{}", render_doctor(&doctor));
            for (label, value) in [
                ("Email", &doctor.email),
                ("Office", &doctor.office_phone),
                ("Mobile", &doctor.mobile_phone),
                ("Emergency", &doctor.emergency_phone),
            ] {
                if !value.is_empty() {
                    println!("  {label}: {value}");
                }
            }
        }
        DoctorsCommand::Delete { id } => {
            api.delete(&id).await?;
            println!("Deleted doctor {id}.");
        }
    }
    Ok(())
}

async fn agenda(ctx: &Context, command: AgendaCommand) -> Result<(), CliError> {
    let backend = ctx.backend()?;
    let api = backend.agenda();
    match command {
        AgendaCommand::List => {
            for entry in api.list().await? {
                println!("{}", render_agenda(&entry));
            }
        }
        AgendaCommand::Add { note, kind, at } => {
            let entry = AgendaEntry::from_note(&note, at.unwrap_or_else(Utc::now), kind.as_deref())?;
            let created = api.create(&entry).await?;
            println!("{}", render_agenda(&created));
        }
        AgendaCommand::Show { id } => {
            let entry = api.view(&id).await?;
            println!("{}", render_agenda(&entry));
            println!("{}", entry.description);
        }
        AgendaCommand::Delete { id } => {
            api.delete(&id).await?;
            println!("Deleted note {id}.");
        }
    }
    Ok(())
}

async fn appointments(ctx: &Context, command: AppointmentsCommand) -> Result<(), CliError> {
    let backend = ctx.backend()?;
    let api = backend.appointments();
    match command {
        AppointmentsCommand::List => {
            for appt in api.list().await? {
                println!("{}", render_appointment(&appt));
            }
        }
        AppointmentsCommand::Add {
            title,
            doctor,
            time,
            location,
            note,
        } => {
            let appt = Appointment {
                id: None,
                title,
                doctor,
                time,
                location,
                note,
            };
            let created = api.create(&appt).await?;
            println!("{}", render_appointment(&created));
        }
        AppointmentsCommand::Delete { id } => {
            api.delete(&id).await?;
            println!("Deleted appointment {id}.");
        }
    }
    Ok(())
}

async fn account(ctx: &Context, command: AccountCommand) -> Result<(), CliError> {
    let backend = ctx.backend()?;
    let users = backend.users();
    let id = backend.session().user().user_id.clone();
    match command {
        AccountCommand::Show => {
            let user = users.current().await?;
            println!("{} {}", user.first_name, user.last_name);
            println!("  Email: {}", user.email);
            if let Some(date) = user.birth_date {
                println!("  Born: {date}");
            }
            if !user.sex.is_empty() {
                println!("  Sex: {}", user.sex);
            }
        }
        AccountCommand::Update(args) => {
            let mut user = users.current().await?;
            if let Some(v) = args.first_name {
                user.first_name = v;
            }
            if let Some(v) = args.last_name {
                user.last_name = v;
            }
            if let Some(v) = args.email {
                user.email = v;
            }
            if let Some(v) = args.sex {
                user.sex = v;
            }
            if args.birth_date.is_some() {
                user.birth_date = args.birth_date;
            }
            user.password = args.password.filter(|p| !p.is_empty());
            users.update(&id, &user).await?;
            println!("Account updated.");
        }
        AccountCommand::Delete { yes } => {
            if !yes {
                return Err(CliError::NotConfirmed);
            }
            users.delete(&id).await?;
            Session::remove(&ctx.session_path()).map_err(ApiError::from)?;
            ctx.scratch().remove()?;
            println!("Account deleted.");
        }
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════

fn id_label(id: Option<&RecordId>) -> String {
    id.map(ToString::to_string).unwrap_or_else(|| "-".into())
}

pub fn render_medication(med: &Medication) -> String {
    let frequency = if med.frequency.is_set() {
        med.frequency.label()
    } else {
        "sin frecuencia"
    };
    let mut line = format!(
        "[{}] {} ({}) · {} · {} dosis",
        id_label(med.id.as_ref()),
        med.name,
        med.display_unit(),
        frequency,
        med.doses.len()
    );
    if med.needs_refill() {
        line.push_str(" · reponer");
    }
    line
}

pub fn render_dose(dose: &Dose) -> String {
    let mut line = format!("  #{} {} x{}", dose.dose_number, dose.time_label(), dose.quantity);
    if let Some(meal) = dose.meal_relation {
        line.push(' ');
        line.push_str(meal.as_str());
    }
    if dose.administered {
        line.push_str(" (tomada)");
    }
    line
}

fn render_medication_detail(med: &Medication) -> String {
    let mut out = render_medication(med);
    for dose in &med.doses {
        out.push('\n');
        out.push_str(&render_dose(dose));
    }
    if let Some(text) = &med.instructions {
        out.push_str("\n  ");
        out.push_str(text);
    }
    out
}

pub fn render_reminder(reminder: &Reminder) -> String {
    format!(
        "{}  [{}] {}: {}{}",
        clock::format_clock(&reminder.time),
        reminder.icon,
        reminder.name,
        reminder.action,
        if reminder.administered { " (tomada)" } else { "" }
    )
}

fn render_doctor(doctor: &Doctor) -> String {
    format!("[{}] {} · {}", id_label(doctor.id.as_ref()), doctor.name, doctor.specialty)
}

fn render_agenda(entry: &AgendaEntry) -> String {
    format!(
        "[{}] {} · {} · {}",
        id_label(entry.id.as_ref()),
        entry.at.format("%Y-%m-%d %H:%M"),
        entry.kind,
        entry.display_title()
    )
}

fn render_appointment(appt: &Appointment) -> String {
    format!(
        "[{}] {} · {} · {} · {}",
        id_label(appt.id.as_ref()),
        appt.time,
        appt.title,
        appt.doctor,
        appt.location
    )
}
