use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::models::{
    ApplicationPatch, JobApplication, MonthlyCount, NewApplication, Status, StatusCount,
    StatusFilter,
};

/// Fire-and-forget success messages shown by the surrounding UI. The store
/// never waits on or reads back from the notifier.
pub trait Notify {
    fn success(&self, message: &str);
}

/// Prints notifications to stdout, for the CLI frontend.
pub struct StdoutNotify;

impl Notify for StdoutNotify {
    fn success(&self, message: &str) {
        println!("{}", message);
    }
}

/// Swallows notifications. Useful when the caller renders its own output,
/// e.g. the interactive board.
pub struct NullNotify;

impl Notify for NullNotify {
    fn success(&self, _message: &str) {}
}

/// Single source of truth for the application collection and the active
/// filter/search criteria. All mutation goes through its methods; derived
/// views are recomputed from current state on every call.
pub struct Store {
    applications: Vec<JobApplication>,
    status_filter: StatusFilter,
    search_query: String,
    notifier: Box<dyn Notify>,
}

impl Store {
    pub fn new(notifier: Box<dyn Notify>) -> Self {
        Self {
            applications: Vec::new(),
            status_filter: StatusFilter::All,
            search_query: String::new(),
            notifier,
        }
    }

    /// A store pre-populated with the example records every session starts
    /// from. There is no persistence; the process is the session.
    pub fn with_seed(notifier: Box<dyn Notify>) -> Self {
        let mut store = Self::new(notifier);
        store.applications = seed_applications();
        store
    }

    // --- Mutations ---

    /// Adds a record, assigning a fresh id and stamping `last_updated` with
    /// today's date. The new record lands at the front of the collection.
    pub fn add(&mut self, input: NewApplication) -> &JobApplication {
        let record = JobApplication {
            id: Uuid::new_v4().to_string(),
            company: input.company,
            position: input.position,
            location: input.location,
            status: input.status,
            date_applied: input.date_applied,
            url: input.url,
            notes: input.notes,
            salary: input.salary,
            contact_name: input.contact_name,
            contact_email: input.contact_email,
            last_updated: today(),
        };
        self.applications.insert(0, record);
        self.notifier.success("Application added successfully");
        &self.applications[0]
    }

    /// Overwrites the provided fields of the matching record and refreshes
    /// `last_updated`. Returns false (collection untouched, no notification)
    /// when no record has that id.
    pub fn update(&mut self, id: &str, patch: ApplicationPatch) -> bool {
        let Some(app) = self.applications.iter_mut().find(|a| a.id == id) else {
            return false;
        };

        if let Some(company) = patch.company {
            app.company = company;
        }
        if let Some(position) = patch.position {
            app.position = position;
        }
        if let Some(location) = patch.location {
            app.location = location;
        }
        if let Some(status) = patch.status {
            app.status = status;
        }
        if let Some(date_applied) = patch.date_applied {
            app.date_applied = date_applied;
        }
        if let Some(url) = patch.url {
            app.url = Some(url);
        }
        if let Some(notes) = patch.notes {
            app.notes = Some(notes);
        }
        if let Some(salary) = patch.salary {
            app.salary = Some(salary);
        }
        if let Some(contact_name) = patch.contact_name {
            app.contact_name = Some(contact_name);
        }
        if let Some(contact_email) = patch.contact_email {
            app.contact_email = Some(contact_email);
        }
        app.last_updated = today();

        self.notifier.success("Application updated successfully");
        true
    }

    /// Removes the matching record. Returns false when no record has that id.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.applications.len();
        self.applications.retain(|a| a.id != id);
        if self.applications.len() == before {
            return false;
        }
        self.notifier.success("Application deleted successfully");
        true
    }

    // --- Criteria ---

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    // --- Reads ---

    pub fn applications(&self) -> &[JobApplication] {
        &self.applications
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&JobApplication> {
        self.applications.iter().find(|a| a.id == id)
    }

    /// The subset matching the active status filter AND the active search
    /// query (case-insensitive substring over company, position, location).
    /// Collection order is preserved.
    pub fn filtered_view(&self) -> Vec<JobApplication> {
        let query = self.search_query.to_lowercase();
        self.applications
            .iter()
            .filter(|app| self.status_filter.matches(app.status))
            .filter(|app| query.is_empty() || matches_query(app, &query))
            .cloned()
            .collect()
    }

    /// Per-status record counts over the full collection, one entry per
    /// status in canonical order. Filter and search are ignored here: the
    /// counts drive badges that always show global totals.
    pub fn status_counts(&self) -> Vec<StatusCount> {
        Status::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: self
                    .applications
                    .iter()
                    .filter(|a| a.status == status)
                    .count(),
            })
            .collect()
    }

    /// Application counts grouped by the (year, month) of `date_applied`,
    /// ascending. Computed over the full collection.
    pub fn monthly_applications(&self) -> Vec<MonthlyCount> {
        let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for app in &self.applications {
            let key = (app.date_applied.year(), app.date_applied.month());
            *months.entry(key).or_insert(0) += 1;
        }
        months
            .into_iter()
            .map(|((year, month), count)| MonthlyCount {
                month: month_label(year, month),
                count,
            })
            .collect()
    }

    /// The most recently updated records, newest first. Ties keep collection
    /// order (stable sort).
    pub fn recent_activity(&self, limit: usize) -> Vec<JobApplication> {
        let mut recent = self.applications.clone();
        recent.sort_by_key(|a| std::cmp::Reverse(a.last_updated));
        recent.truncate(limit);
        recent
    }
}

fn matches_query(app: &JobApplication, query: &str) -> bool {
    app.company.to_lowercase().contains(query)
        || app.position.to_lowercase().contains(query)
        || app.location.to_lowercase().contains(query)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn month_label(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => first.format("%b %Y").to_string(),
        // Month always comes from a valid NaiveDate, so this arm is unreachable.
        None => format!("{:04}-{:02}", year, month),
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

/// The fixed example data a fresh session starts from: five applications,
/// one per status.
fn seed_applications() -> Vec<JobApplication> {
    vec![
        JobApplication {
            id: Uuid::new_v4().to_string(),
            company: "Tech Innovations Inc.".to_string(),
            position: "Frontend Developer".to_string(),
            location: "San Francisco, CA".to_string(),
            status: Status::Interview,
            date_applied: ymd(2025, 3, 15),
            url: Some("https://techinnovations.com/careers".to_string()),
            notes: Some(
                "Had first interview with the hiring manager. Waiting for technical round."
                    .to_string(),
            ),
            salary: Some("$120,000 - $140,000".to_string()),
            contact_name: Some("Sarah Johnson".to_string()),
            contact_email: Some("sjohnson@techinnovations.com".to_string()),
            last_updated: ymd(2025, 3, 20),
        },
        JobApplication {
            id: Uuid::new_v4().to_string(),
            company: "Global Solutions".to_string(),
            position: "Full Stack Engineer".to_string(),
            location: "Remote".to_string(),
            status: Status::Applied,
            date_applied: ymd(2025, 3, 18),
            url: Some("https://globalsolutions.co/jobs".to_string()),
            notes: None,
            salary: None,
            contact_name: None,
            contact_email: None,
            last_updated: ymd(2025, 3, 18),
        },
        JobApplication {
            id: Uuid::new_v4().to_string(),
            company: "DataViz Systems".to_string(),
            position: "React Developer".to_string(),
            location: "Austin, TX".to_string(),
            status: Status::Rejected,
            date_applied: ymd(2025, 3, 10),
            url: None,
            notes: Some("Position was filled internally.".to_string()),
            salary: None,
            contact_name: None,
            contact_email: None,
            last_updated: ymd(2025, 3, 25),
        },
        JobApplication {
            id: Uuid::new_v4().to_string(),
            company: "Startup Labs".to_string(),
            position: "UI/UX Developer".to_string(),
            location: "New York, NY".to_string(),
            status: Status::Offer,
            date_applied: ymd(2025, 3, 5),
            url: Some("https://startuplabs.io/careers".to_string()),
            notes: Some("Received offer: $115,000 with good benefits package.".to_string()),
            salary: Some("$115,000".to_string()),
            contact_name: Some("Michael Wu".to_string()),
            contact_email: Some("mwu@startuplabs.io".to_string()),
            last_updated: ymd(2025, 4, 2),
        },
        JobApplication {
            id: Uuid::new_v4().to_string(),
            company: "CloudScale Technologies".to_string(),
            position: "JavaScript Developer".to_string(),
            location: "Boston, MA".to_string(),
            status: Status::Pending,
            date_applied: ymd(2025, 4, 5),
            url: Some("https://cloudscaletech.com/careers".to_string()),
            notes: None,
            salary: None,
            contact_name: None,
            contact_email: None,
            last_updated: ymd(2025, 4, 5),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every notification so tests can assert on emission.
    struct RecordingNotify {
        messages: Rc<RefCell<Vec<String>>>,
    }

    impl Notify for RecordingNotify {
        fn success(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    fn recording_store() -> (Store, Rc<RefCell<Vec<String>>>) {
        let messages = Rc::new(RefCell::new(Vec::new()));
        let notify = RecordingNotify {
            messages: Rc::clone(&messages),
        };
        (Store::new(Box::new(notify)), messages)
    }

    fn quiet_store() -> Store {
        Store::new(Box::new(NullNotify))
    }

    fn seeded_store() -> Store {
        Store::with_seed(Box::new(NullNotify))
    }

    fn new_app(company: &str, position: &str, location: &str, status: Status, date: &str) -> NewApplication {
        NewApplication {
            company: company.to_string(),
            position: position.to_string(),
            location: location.to_string(),
            status,
            date_applied: date.parse().unwrap(),
            url: None,
            notes: None,
            salary: None,
            contact_name: None,
            contact_email: None,
        }
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut store = quiet_store();
        for i in 0..50 {
            store.add(new_app(
                &format!("Company {}", i),
                "Engineer",
                "Remote",
                Status::Applied,
                "2025-01-01",
            ));
        }
        let mut ids: Vec<&str> = store.applications().iter().map(|a| a.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_add_prepends() {
        let mut store = quiet_store();
        store.add(new_app("First", "Eng", "Remote", Status::Applied, "2025-01-01"));
        store.add(new_app("Second", "Eng", "Remote", Status::Applied, "2025-01-02"));
        assert_eq!(store.applications()[0].company, "Second");
        assert_eq!(store.applications()[1].company, "First");
    }

    #[test]
    fn test_filter_is_conjunction_of_status_and_search() {
        let mut store = quiet_store();
        store.add(new_app("Acme", "Engineer", "Remote", Status::Applied, "2025-01-01"));
        store.add(new_app("Acme", "Designer", "Berlin", Status::Applied, "2025-01-02"));
        store.add(new_app("Orbit", "Engineer", "Remote", Status::Interview, "2025-01-03"));

        // Status alone
        store.set_status_filter(StatusFilter::Only(Status::Applied));
        assert_eq!(store.filtered_view().len(), 2);

        // Status AND search: only the applied record in a remote location
        store.set_search_query("remote");
        let view = store.filtered_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].company, "Acme");
        assert_eq!(view[0].position, "Engineer");

        // Search alone matches across statuses
        store.set_status_filter(StatusFilter::All);
        assert_eq!(store.filtered_view().len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let mut store = quiet_store();
        store.add(new_app("MegaCorp", "Engineer", "Oslo", Status::Applied, "2025-01-01"));
        store.add(new_app("Acme", "Megastructure Architect", "Oslo", Status::Applied, "2025-01-02"));
        store.add(new_app("Acme", "Engineer", "Megacity One", Status::Applied, "2025-01-03"));
        store.add(new_app("Acme", "Engineer", "Oslo", Status::Applied, "2025-01-04"));

        store.set_search_query("MEGA");
        assert_eq!(store.filtered_view().len(), 3);
    }

    #[test]
    fn test_status_counts_sum_to_collection_length() {
        let mut store = seeded_store();
        store.set_status_filter(StatusFilter::Only(Status::Offer));
        store.set_search_query("remote");

        // Counts are global: filter and search must not change them.
        let counts = store.status_counts();
        assert_eq!(counts.len(), 5);
        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, store.len());
    }

    #[test]
    fn test_status_counts_canonical_order_with_zeros() {
        let mut store = quiet_store();
        store.add(new_app("Acme", "Eng", "Remote", Status::Rejected, "2025-01-01"));

        let counts = store.status_counts();
        let order: Vec<Status> = counts.iter().map(|c| c.status).collect();
        assert_eq!(order, Status::ALL.to_vec());
        assert_eq!(counts[3].count, 1); // rejected
        assert_eq!(counts[0].count, 0);
        assert_eq!(counts[1].count, 0);
        assert_eq!(counts[2].count, 0);
        assert_eq!(counts[4].count, 0);
    }

    #[test]
    fn test_update_merges_fields_and_refreshes_last_updated() {
        let mut store = seeded_store();
        let id = store.applications()[0].id.clone();
        let before = store.get(&id).unwrap().clone();

        let changed = store.update(
            &id,
            ApplicationPatch {
                status: Some(Status::Offer),
                notes: Some("Signed!".to_string()),
                ..ApplicationPatch::default()
            },
        );

        assert!(changed);
        let after = store.get(&id).unwrap();
        assert_eq!(after.status, Status::Offer);
        assert_eq!(after.notes.as_deref(), Some("Signed!"));
        // Untouched fields survive the merge
        assert_eq!(after.company, before.company);
        assert_eq!(after.date_applied, before.date_applied);
        assert!(after.last_updated >= before.last_updated);
    }

    #[test]
    fn test_update_unknown_id_is_a_no_op() {
        let mut store = seeded_store();
        let snapshot: Vec<JobApplication> = store.applications().to_vec();

        let changed = store.update("no-such-id", ApplicationPatch::status(Status::Offer));

        assert!(!changed);
        assert_eq!(store.len(), snapshot.len());
        for (before, after) in snapshot.iter().zip(store.applications()) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.status, after.status);
            assert_eq!(before.last_updated, after.last_updated);
        }
    }

    #[test]
    fn test_status_transitions_are_unrestricted() {
        let mut store = quiet_store();
        store.add(new_app("Acme", "Eng", "Remote", Status::Rejected, "2025-01-01"));
        let id = store.applications()[0].id.clone();

        // No terminal state: rejected can go back to interview and onward.
        assert!(store.update(&id, ApplicationPatch::status(Status::Interview)));
        assert_eq!(store.get(&id).unwrap().status, Status::Interview);
        assert!(store.update(&id, ApplicationPatch::status(Status::Offer)));
        assert_eq!(store.get(&id).unwrap().status, Status::Offer);
    }

    #[test]
    fn test_remove_deletes_exactly_one() {
        let mut store = seeded_store();
        assert_eq!(store.len(), 5);
        let id = store.applications()[2].id.clone();

        assert!(store.remove(&id));
        assert_eq!(store.len(), 4);
        assert!(store.get(&id).is_none());

        let total: usize = store.status_counts().iter().map(|c| c.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_remove_unknown_id_is_a_no_op() {
        let mut store = seeded_store();
        assert!(!store.remove("no-such-id"));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_monthly_grouping_and_order() {
        let mut store = quiet_store();
        store.add(new_app("A", "Eng", "Remote", Status::Applied, "2025-03-15"));
        store.add(new_app("B", "Eng", "Remote", Status::Applied, "2025-03-18"));
        store.add(new_app("C", "Eng", "Remote", Status::Applied, "2025-04-05"));

        let monthly = store.monthly_applications();
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].month, "Mar 2025");
        assert_eq!(monthly[0].count, 2);
        assert_eq!(monthly[1].month, "Apr 2025");
        assert_eq!(monthly[1].count, 1);
    }

    #[test]
    fn test_monthly_sorts_across_years() {
        let mut store = quiet_store();
        store.add(new_app("A", "Eng", "Remote", Status::Applied, "2025-01-10"));
        store.add(new_app("B", "Eng", "Remote", Status::Applied, "2024-12-31"));

        let monthly = store.monthly_applications();
        assert_eq!(monthly[0].month, "Dec 2024");
        assert_eq!(monthly[1].month, "Jan 2025");
    }

    #[test]
    fn test_scenario_single_add() {
        let mut store = quiet_store();
        store.add(new_app("Acme", "Eng", "Remote", Status::Applied, "2025-01-01"));

        let view = store.filtered_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].company, "Acme");

        let counts = store.status_counts();
        assert_eq!(counts[0].status, Status::Applied);
        assert_eq!(counts[0].count, 1);
        assert!(counts[1..].iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_scenario_seeded_filter_then_search() {
        let mut store = seeded_store();

        store.set_status_filter(StatusFilter::Only(Status::Interview));
        let view = store.filtered_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].company, "Tech Innovations Inc.");

        store.set_status_filter(StatusFilter::All);
        store.set_search_query("remote");
        let view = store.filtered_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].company, "Global Solutions");
        assert!(view[0].location.to_lowercase().contains("remote"));
    }

    #[test]
    fn test_notifications_fire_once_per_successful_mutation() {
        let (mut store, messages) = recording_store();

        let id = store
            .add(new_app("Acme", "Eng", "Remote", Status::Applied, "2025-01-01"))
            .id
            .clone();
        store.update(&id, ApplicationPatch::status(Status::Interview));
        store.remove(&id);

        assert_eq!(
            *messages.borrow(),
            vec![
                "Application added successfully".to_string(),
                "Application updated successfully".to_string(),
                "Application deleted successfully".to_string(),
            ]
        );
    }

    #[test]
    fn test_missed_mutations_do_not_notify() {
        let (mut store, messages) = recording_store();
        store.update("no-such-id", ApplicationPatch::status(Status::Offer));
        store.remove("no-such-id");
        assert!(messages.borrow().is_empty());
    }

    #[test]
    fn test_seed_has_one_record_per_status() {
        let store = seeded_store();
        assert_eq!(store.len(), 5);
        for count in store.status_counts() {
            assert_eq!(count.count, 1, "expected one {} record", count.status);
        }
        assert_eq!(store.applications()[0].company, "Tech Innovations Inc.");
        assert_eq!(store.applications()[4].company, "CloudScale Technologies");
    }

    #[test]
    fn test_recent_activity_orders_by_last_updated() {
        let store = seeded_store();
        let recent = store.recent_activity(3);
        assert_eq!(recent.len(), 3);
        // Seed last_updated dates: CloudScale 04-05, Startup Labs 04-02,
        // DataViz 03-25.
        assert_eq!(recent[0].company, "CloudScale Technologies");
        assert_eq!(recent[1].company, "Startup Labs");
        assert_eq!(recent[2].company, "DataViz Systems");
    }

    #[test]
    fn test_search_query_is_kept_verbatim() {
        let mut store = quiet_store();
        store.set_search_query("  Remote ");
        assert_eq!(store.search_query(), "  Remote ");
        // Untrimmed query means the padded string must match as a substring.
        store.add(new_app("Acme", "Eng", "Remote", Status::Applied, "2025-01-01"));
        assert!(store.filtered_view().is_empty());
    }
}
