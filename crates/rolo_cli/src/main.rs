//! CLI probe for `rolo_core`.
//!
//! # Responsibility
//! - Open (or demo-seed) a database, attach the live views for the local
//!   user, and render the projections once.
//! - Keep output deterministic enough for quick local sanity checks.
//!
//! Usage: `rolo [db-path]`. Without a path an in-memory database is
//! seeded with sample data; attaching the views also runs one archival
//! sweep, so expired meetings land in their contact's history before
//! rendering.

use std::process::ExitCode;
use std::rc::Rc;

use rolo_core::link::{meeting_contact_label, referral_label, task_contact_label};
use rolo_core::{
    classify, AuthProvider, Clock, ContactService, LiveViews, MeetingService, NewContact,
    NewMeeting, NewTask, SingleUserAuth, SqliteEntityStore, SystemClock, TaskService,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("rolo: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let db_path = std::env::args().nth(1);

    // Logging failures must not stop a read-only probe.
    let log_dir = std::env::temp_dir().join("rolo-logs");
    if let Err(err) = rolo_core::init_logging(rolo_core::default_log_level(), &log_dir) {
        eprintln!("rolo: logging disabled: {err}");
    }

    let auth = SingleUserAuth::signed_in("local");
    let Some(user) = auth.current_user() else {
        // No user means no data to render, not an error.
        println!("not signed in; nothing to show");
        return Ok(());
    };

    let conn = match &db_path {
        Some(path) => rolo_core::db::open_db(path),
        None => rolo_core::db::open_db_in_memory(),
    }
    .map_err(|err| format!("failed to open database: {err}"))?;

    let store = Rc::new(SqliteEntityStore::new(conn));
    let clock = Rc::new(SystemClock);

    if db_path.is_none() {
        seed_demo(store.as_ref(), &clock, &user)?;
    }

    let views = LiveViews::attach(Rc::clone(&store), Rc::clone(&clock), user.clone());
    let contacts = views.contacts();
    let now = clock.now();

    println!("rolo {} — user `{user}`", rolo_core::core_version());

    println!("\nMeetings:");
    let meetings = views.meetings();
    if meetings.is_empty() {
        println!("  (no upcoming meetings)");
    }
    for meeting in &meetings {
        let tier = meeting
            .instant()
            .map(|instant| classify(instant, now))
            .unwrap_or(rolo_core::UrgencyTier::Normal);
        println!(
            "  [{tier:?}] {} — {} at {} with {}",
            meeting.topic,
            meeting.date,
            meeting.time,
            meeting_contact_label(&contacts, meeting.contact_id.as_deref())
        );
    }

    println!("\nTasks:");
    let tasks = views.tasks();
    if tasks.is_empty() {
        println!("  (no tasks)");
    }
    for task in &tasks {
        let due = task.due_date.as_deref().unwrap_or("no due date");
        match task_contact_label(&contacts, task.contact_id.as_deref()) {
            Some(name) => println!("  {} (due {due}, {name})", task.title),
            None => println!("  {} (due {due})", task.title),
        }
    }

    println!("\nContacts:");
    if contacts.is_empty() {
        println!("  (no contacts)");
    }
    for contact in &contacts {
        let mut line = contact.full_name();
        if let Some(company) = &contact.company {
            line.push_str(&format!(" — {company}"));
        }
        if let Some(referrer) = referral_label(&contacts, contact.referred_by.as_deref()) {
            line.push_str(&format!(" (introduced by {referrer})"));
        }
        println!("  {line}");
        for (_, entry) in contact.history_newest_first() {
            println!("    past: {} — {} at {}", entry.topic, entry.date, entry.time);
        }
    }

    Ok(())
}

fn seed_demo(store: &SqliteEntityStore, clock: &Rc<SystemClock>, user: &str) -> Result<(), String> {
    let user = user.to_string();
    let contact_service = ContactService::new(store, clock.as_ref(), user.clone());
    let task_service = TaskService::new(store, clock.as_ref(), user.clone());
    let meeting_service = MeetingService::new(store, clock.as_ref(), user);

    let dana = contact_service
        .add(NewContact {
            first_name: "Dana".to_string(),
            last_name: "Whitfield".to_string(),
            company: Some("Initech".to_string()),
            referred_by: Some("LinkedIn".to_string()),
        })
        .map_err(|err| format!("seed contact: {err}"))?;

    task_service
        .add(NewTask {
            title: "Send follow-up email".to_string(),
            due_date: Some(clock.now().format("%Y-%m-%d").to_string()),
            contact_id: Some(dana.id.clone()),
        })
        .map_err(|err| format!("seed task: {err}"))?;

    let tomorrow = (clock.now() + chrono::Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();
    meeting_service
        .add(NewMeeting {
            topic: "Coffee catch-up".to_string(),
            date: tomorrow,
            time: "10:00".to_string(),
            contact_id: Some(dana.id),
        })
        .map_err(|err| format!("seed meeting: {err}"))?;

    Ok(())
}
