use rolo_core::db::open_db_in_memory;
use rolo_core::{
    Collection, ContactService, EntityStore, FixedClock, LiveViews, MeetingService, NewContact,
    NewMeeting, NewTask, SqliteEntityStore, TaskService,
};
use std::rc::Rc;

fn store() -> Rc<SqliteEntityStore> {
    Rc::new(SqliteEntityStore::new(open_db_in_memory().unwrap()))
}

fn user() -> String {
    "u1".to_string()
}

fn clock_at(value: &str) -> FixedClock {
    FixedClock::parse(value).unwrap()
}

#[test]
fn projections_prime_from_initial_snapshots() {
    let store = store();
    let user = user();
    let creation = clock_at("2023-12-30T09:00:00");

    let tasks = TaskService::new(store.as_ref(), &creation, user.clone());
    tasks
        .add(NewTask {
            title: "undated first".to_string(),
            ..NewTask::default()
        })
        .unwrap();
    let mut later = creation;
    later.advance(chrono::Duration::seconds(1));
    TaskService::new(store.as_ref(), &later, user.clone())
        .add(NewTask {
            title: "dated".to_string(),
            due_date: Some("2024-01-01".to_string()),
            ..NewTask::default()
        })
        .unwrap();

    let meetings = MeetingService::new(store.as_ref(), &creation, user.clone());
    meetings
        .add(NewMeeting {
            topic: "Later meeting".to_string(),
            date: "2024-01-02".to_string(),
            time: "09:00".to_string(),
            ..NewMeeting::default()
        })
        .unwrap();
    MeetingService::new(store.as_ref(), &later, user.clone())
        .add(NewMeeting {
            topic: "Earlier meeting".to_string(),
            date: "2024-01-01".to_string(),
            time: "08:00".to_string(),
            ..NewMeeting::default()
        })
        .unwrap();

    let observation = Rc::new(clock_at("2023-12-31T09:00:00"));
    let views = LiveViews::attach(Rc::clone(&store), observation, user);

    let meeting_topics: Vec<String> = views.meetings().iter().map(|m| m.topic.clone()).collect();
    assert_eq!(meeting_topics, vec!["Earlier meeting", "Later meeting"]);

    let task_titles: Vec<String> = views.tasks().iter().map(|t| t.title.clone()).collect();
    assert_eq!(task_titles, vec!["dated", "undated first"]);
}

#[test]
fn attach_archives_already_expired_meetings() {
    let store = store();
    let user = user();
    let creation = clock_at("2023-12-30T09:00:00");

    let contact = ContactService::new(store.as_ref(), &creation, user.clone())
        .add(NewContact {
            first_name: "Dana".to_string(),
            last_name: "Whitfield".to_string(),
            ..NewContact::default()
        })
        .unwrap();
    let mut later = creation;
    later.advance(chrono::Duration::seconds(1));
    MeetingService::new(store.as_ref(), &later, user.clone())
        .add(NewMeeting {
            topic: "Coffee catch-up".to_string(),
            date: "2024-01-01".to_string(),
            time: "10:00".to_string(),
            contact_id: Some(contact.id.clone()),
        })
        .unwrap();

    let observation = Rc::new(clock_at("2024-01-01T12:01:00"));
    let views = LiveViews::attach(Rc::clone(&store), Rc::clone(&observation), user.clone());

    // The sweep's own deletions re-notify the meetings subscription, so
    // the settled projection is already empty.
    assert!(views.meetings().is_empty());
    assert!(store.get(&user, Collection::Meetings).unwrap().is_empty());

    let contacts = views.contacts();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].meeting_history.len(), 1);
    let entry = contacts[0].meeting_history.values().next().unwrap();
    assert_eq!(entry.topic, "Coffee catch-up");
}

#[test]
fn mutations_after_attach_update_projections() {
    let store = store();
    let user = user();
    let clock = Rc::new(clock_at("2023-12-30T09:00:00"));
    let views = LiveViews::attach(Rc::clone(&store), Rc::clone(&clock), user.clone());
    assert!(views.tasks().is_empty());

    TaskService::new(store.as_ref(), clock.as_ref(), user.clone())
        .add(NewTask {
            title: "new arrival".to_string(),
            ..NewTask::default()
        })
        .unwrap();
    assert_eq!(views.tasks().len(), 1);

    let tasks = TaskService::new(store.as_ref(), clock.as_ref(), user.clone());
    let id = views.tasks()[0].id.clone();
    tasks.complete(&id).unwrap();
    assert!(views.tasks().is_empty(), "completion deletes immediately");
}

#[test]
fn search_term_filters_contact_projection() {
    let store = store();
    let user = user();
    let clock = Rc::new(clock_at("2023-12-30T09:00:00"));

    let contacts = ContactService::new(store.as_ref(), clock.as_ref(), user.clone());
    contacts
        .add(NewContact {
            first_name: "Dana".to_string(),
            last_name: "Whitfield".to_string(),
            company: Some("Initech".to_string()),
            ..NewContact::default()
        })
        .unwrap();
    let mut later = *clock;
    later.advance(chrono::Duration::seconds(1));
    ContactService::new(store.as_ref(), &later, user.clone())
        .add(NewContact {
            first_name: "Priya".to_string(),
            last_name: "Natarajan".to_string(),
            company: Some("Globex".to_string()),
            ..NewContact::default()
        })
        .unwrap();

    let views = LiveViews::attach(Rc::clone(&store), clock, user);
    assert_eq!(views.contacts().len(), 2);

    views.set_search_term("globex");
    let filtered = views.contacts();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].first_name, "Priya");

    views.set_search_term("");
    assert_eq!(views.contacts().len(), 2);
}

#[test]
fn dropping_views_detaches_subscriptions() {
    let store = store();
    let user = user();
    let clock = Rc::new(clock_at("2023-12-30T09:00:00"));

    let views = LiveViews::attach(Rc::clone(&store), Rc::clone(&clock), user.clone());
    drop(views);

    // Writes after the drop must not reach any stale handler.
    TaskService::new(store.as_ref(), clock.as_ref(), user)
        .add(NewTask {
            title: "after drop".to_string(),
            ..NewTask::default()
        })
        .unwrap();
}
