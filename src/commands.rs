use std::io::{self, BufRead, Write};

use anyhow::anyhow;
use chrono::Utc;

use crate::api::Transport;
use crate::due;
use crate::editors::assignment::AssignmentDraft;
use crate::editors::cohort::CohortDraft;
use crate::editors::league::LeagueDraft;
use crate::editors::resource::{self, ResourceDraft, ResourceFilter, SectionExpansion};
use crate::editors::section::SectionDraft;
use crate::editors::specialization::{LeagueOrder, SpecializationDraft};
use crate::editors::week::WeekDraft;
use crate::error::EditorError;
use crate::form::{Draft, Editor};
use crate::hierarchy;
use crate::import;
use crate::models::{
    Assignment, Cohort, Collection, League, Resource, Section, Specialization, Week,
};
use crate::report;
use crate::store::{AdminPage, HasList, Lists};
use crate::users::{self, UserFilter};
use crate::{
    AssignmentAction, CohortAction, Commands, DeleteArgs, LeagueAction, ResourceAction,
    SectionAction, SpecializationAction, UserAction, WeekAction,
};

pub(crate) async fn run<T: Transport>(
    page: &mut AdminPage<T>,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Cohort { action } => cohort(page, action).await,
        Commands::League { action } => league(page, action).await,
        Commands::Specialization { action } => specialization(page, action).await,
        Commands::Week { action } => week(page, action).await,
        Commands::Section { action } => section(page, action).await,
        Commands::Resource { action } => resource(page, action).await,
        Commands::Assignment { action } => assignment(page, action).await,
        Commands::User { action } => user(page, action).await,
        Commands::Report {
            cohort,
            with_members,
            out,
        } => {
            page.load::<Cohort>().await?;
            let cohort = match cohort {
                Some(id) => Some(
                    page.lists
                        .cohorts
                        .get(&id)
                        .cloned()
                        .ok_or_else(|| anyhow!("cohort {id} not found"))?,
                ),
                None => None,
            };
            page.load::<League>().await?;
            page.load::<Specialization>().await?;
            page.load::<Week>().await?;
            page.load::<Section>().await?;
            let (league_ids, section_ids) = {
                let leagues = hierarchy::leagues_in(
                    page.lists.leagues.as_slice(),
                    cohort.as_ref().map(|c| c.id.as_str()),
                );
                let section_ids = hierarchy::section_ids_under(
                    &leagues,
                    page.lists.weeks.as_slice(),
                    page.lists.sections.as_slice(),
                );
                (ids(leagues.into_iter().map(|l| &l.id)), section_ids)
            };
            page.load_resources(&section_ids).await?;
            page.load_assignments(&league_ids).await?;
            if with_members {
                page.load_users().await?;
            }

            let report = report::build_report(cohort.as_ref(), &page.lists, Utc::now());
            std::fs::write(&out, report)?;
            println!(
                "Report written to {} ({} resources).",
                out.display(),
                page.lists.resources.len()
            );
            Ok(())
        }
        Commands::ImportResources { csv, section } => {
            let summary = import::import_csv(page, &csv, section.as_deref()).await?;
            println!(
                "Imported {} resources from {} ({} skipped).",
                summary.inserted,
                csv.display(),
                summary.skipped
            );
            Ok(())
        }
    }
}

fn ids<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values.cloned().collect()
}

/// Blocks on stdin unless `--yes` was given.
fn confirmation(yes: bool) -> impl FnOnce(&str) -> bool {
    move |warning| {
        if yes {
            return true;
        }
        print!("{warning} [y/N] ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

fn editor_failure<D: Draft>(editor: &Editor<D>, err: EditorError) -> anyhow::Error {
    match err {
        EditorError::Invalid(_) => {
            for (field, message) in editor.errors().iter() {
                eprintln!("  {field}: {message}");
            }
            anyhow!("validation failed")
        }
        other => other.into(),
    }
}

async fn create<T, D>(page: &mut AdminPage<T>, draft: D) -> anyhow::Result<D::Entity>
where
    T: Transport,
    D: Draft,
    Lists: HasList<D::Entity>,
{
    let mut editor = Editor::<D>::default();
    editor.start_create_with(draft);
    let result = page.submit(&mut editor).await;
    result.map_err(|err| editor_failure(&editor, err))
}

async fn edit<T, D>(
    page: &mut AdminPage<T>,
    id: &str,
    change: impl FnOnce(&mut D),
) -> anyhow::Result<D::Entity>
where
    T: Transport,
    D: Draft,
    Lists: HasList<D::Entity>,
{
    let entity = HasList::<D::Entity>::list(&page.lists)
        .get(id)
        .cloned()
        .ok_or_else(|| anyhow!("{} {id} not found", <D::Entity as Collection>::KIND))?;
    let mut editor = Editor::<D>::default();
    editor.start_edit(&entity);
    change(&mut editor.draft);
    let result = page.submit(&mut editor).await;
    result.map_err(|err| editor_failure(&editor, err))
}

async fn delete<T, E>(page: &mut AdminPage<T>, id: &str, yes: bool) -> anyhow::Result<()>
where
    T: Transport,
    E: Collection,
    Lists: HasList<E>,
{
    if page.delete::<E>(id, confirmation(yes)).await? {
        println!("Deleted {} {id}.", E::KIND);
    } else {
        println!("Cancelled.");
    }
    Ok(())
}

async fn cohort<T: Transport>(page: &mut AdminPage<T>, action: CohortAction) -> anyhow::Result<()> {
    page.load::<Cohort>().await?;
    match action {
        CohortAction::List => {
            for cohort in page.lists.cohorts.as_slice() {
                let state = if cohort.is_active { "active" } else { "inactive" };
                println!("- {} [{}] {}", cohort.name, state, cohort.id);
            }
        }
        CohortAction::Create {
            name,
            description,
            inactive,
        } => {
            let cohort = create(
                page,
                CohortDraft {
                    name,
                    description,
                    is_active: !inactive,
                },
            )
            .await?;
            println!("Created cohort {} ({}).", cohort.name, cohort.id);
        }
        CohortAction::Update {
            id,
            name,
            description,
            active,
        } => {
            let cohort = edit(page, &id, |draft: &mut CohortDraft| {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if let Some(active) = active {
                    draft.is_active = active;
                }
            })
            .await?;
            println!("Updated cohort {}.", cohort.name);
        }
        CohortAction::Delete(DeleteArgs { id, yes }) => delete::<T, Cohort>(page, &id, yes).await?,
    }
    Ok(())
}

async fn league<T: Transport>(page: &mut AdminPage<T>, action: LeagueAction) -> anyhow::Result<()> {
    page.load::<League>().await?;
    match action {
        LeagueAction::List { cohort } => {
            for league in hierarchy::leagues_in(page.lists.leagues.as_slice(), cohort.as_deref()) {
                println!("- {} (cohort {}) {}", league.name, league.cohort_id, league.id);
            }
        }
        LeagueAction::Create {
            name,
            description,
            cohort,
        } => {
            let league = create(
                page,
                LeagueDraft {
                    name,
                    description,
                    cohort_id: cohort,
                },
            )
            .await?;
            println!("Created league {} ({}).", league.name, league.id);
        }
        LeagueAction::Update {
            id,
            name,
            description,
            cohort,
        } => {
            let league = edit(page, &id, |draft: &mut LeagueDraft| {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if let Some(cohort) = cohort {
                    draft.cohort_id = cohort;
                }
            })
            .await?;
            println!("Updated league {}.", league.name);
        }
        LeagueAction::Delete(DeleteArgs { id, yes }) => delete::<T, League>(page, &id, yes).await?,
    }
    Ok(())
}

fn print_specialization(specialization: &Specialization, leagues: &[League]) {
    let draft = SpecializationDraft::from_entity(specialization);
    println!(
        "- {} (cohort {}, {} leagues) {}",
        specialization.name,
        specialization.cohort_id,
        draft.leagues.len(),
        specialization.id
    );
    for entry in draft.leagues.entries() {
        let name = leagues
            .iter()
            .find(|league| league.id == entry.league_id)
            .map_or(entry.league_id.as_str(), |league| league.name.as_str());
        println!("  {}. {}", entry.order, name);
    }
}

/// Applies `--move-up` then `--move-down` in order. Returns a note for every
/// move that hit an edge or named a league not in the list.
fn reorder(leagues: &mut LeagueOrder, move_up: &[String], move_down: &[String]) -> Vec<String> {
    let mut blocked = Vec::new();
    for league_id in move_up {
        let moved = leagues
            .position(league_id)
            .is_some_and(|index| leagues.move_up(index));
        if !moved {
            blocked.push(format!("{league_id} cannot move up"));
        }
    }
    for league_id in move_down {
        let moved = leagues
            .position(league_id)
            .is_some_and(|index| leagues.move_down(index));
        if !moved {
            blocked.push(format!("{league_id} cannot move down"));
        }
    }
    blocked
}

async fn specialization<T: Transport>(
    page: &mut AdminPage<T>,
    action: SpecializationAction,
) -> anyhow::Result<()> {
    page.load::<League>().await?;
    page.load::<Specialization>().await?;
    match action {
        SpecializationAction::List { cohort } => {
            for specialization in page.lists.specializations.as_slice() {
                if cohort.as_deref().is_some_and(|id| id != specialization.cohort_id) {
                    continue;
                }
                print_specialization(specialization, page.lists.leagues.as_slice());
            }
        }
        SpecializationAction::Create {
            name,
            description,
            cohort,
            leagues,
        } => {
            let mut draft = SpecializationDraft {
                name,
                description,
                cohort_id: cohort,
                ..SpecializationDraft::default()
            };
            for league_id in &leagues {
                draft.leagues.toggle(league_id, true);
            }
            let created = create(page, draft).await?;
            print_specialization(&created, page.lists.leagues.as_slice());
        }
        SpecializationAction::Update {
            id,
            name,
            description,
            add,
            remove,
            move_up,
            move_down,
        } => {
            let mut blocked = Vec::new();
            let updated = edit(page, &id, |draft: &mut SpecializationDraft| {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                for league_id in &add {
                    draft.leagues.toggle(league_id, true);
                }
                for league_id in &remove {
                    draft.leagues.toggle(league_id, false);
                }
                blocked.extend(reorder(&mut draft.leagues, &move_up, &move_down));
            })
            .await?;
            for note in blocked {
                eprintln!("skipped: {note}");
            }
            print_specialization(&updated, page.lists.leagues.as_slice());
        }
        SpecializationAction::Delete(DeleteArgs { id, yes }) => {
            delete::<T, Specialization>(page, &id, yes).await?;
        }
    }
    Ok(())
}

async fn week<T: Transport>(page: &mut AdminPage<T>, action: WeekAction) -> anyhow::Result<()> {
    page.load::<Week>().await?;
    match action {
        WeekAction::List { league } => {
            page.selection.select_league(league);
            for week in page.weeks_for_selection() {
                println!(
                    "- Week {}: {} (league {}) {}",
                    week.order, week.name, week.league_id, week.id
                );
            }
        }
        WeekAction::Create {
            league,
            name,
            description,
            order,
        } => {
            page.selection.select_league(league);
            let draft = WeekDraft {
                name,
                description,
                order,
                ..WeekDraft::in_league(page.selection.league_id())
            };
            let week = create(page, draft).await?;
            println!("Created week {} ({}).", week.name, week.id);
        }
        WeekAction::Update {
            id,
            name,
            description,
            order,
            league,
        } => {
            let week = edit(page, &id, |draft: &mut WeekDraft| {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if let Some(order) = order {
                    draft.order = order;
                }
                if let Some(league) = league {
                    draft.league_id = league;
                }
            })
            .await?;
            println!("Updated week {}.", week.name);
        }
        WeekAction::Delete(DeleteArgs { id, yes }) => delete::<T, Week>(page, &id, yes).await?,
    }
    Ok(())
}

async fn section<T: Transport>(page: &mut AdminPage<T>, action: SectionAction) -> anyhow::Result<()> {
    page.load::<Week>().await?;
    page.load::<Section>().await?;
    match action {
        SectionAction::List { league, week } => {
            page.selection.select_league(league);
            page.selection.select_week(week);
            for section in page.sections_for_selection() {
                println!(
                    "- {}. {} (week {}) {}",
                    section.order, section.name, section.week_id, section.id
                );
            }
        }
        SectionAction::Create {
            week,
            name,
            description,
            order,
        } => {
            page.selection.select_week(week);
            let draft = SectionDraft {
                name,
                description,
                order,
                ..SectionDraft::in_week(page.selection.week_id())
            };
            let section = create(page, draft).await?;
            println!("Created section {} ({}).", section.name, section.id);
        }
        SectionAction::Update {
            id,
            name,
            description,
            order,
            week,
        } => {
            let section = edit(page, &id, |draft: &mut SectionDraft| {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if let Some(order) = order {
                    draft.order = order;
                }
                if let Some(week) = week {
                    draft.week_id = week;
                }
            })
            .await?;
            println!("Updated section {}.", section.name);
        }
        SectionAction::Delete(DeleteArgs { id, yes }) => delete::<T, Section>(page, &id, yes).await?,
    }
    Ok(())
}

fn print_resource_groups(
    page_sections: &[&Section],
    resources: &[&Resource],
    expansion: &SectionExpansion,
) {
    let groups = resource::group_by_section(resources.iter().copied());
    if groups.is_empty() {
        println!("No resources match.");
        return;
    }
    for (section_id, members) in groups {
        let name = page_sections
            .iter()
            .find(|section| section.id == section_id)
            .map_or(section_id, |section| section.name.as_str());
        if !expansion.is_expanded(section_id) {
            println!("▸ {} ({} resources)", name, members.len());
            continue;
        }
        println!("▾ {} ({} resources)", name, members.len());
        for resource in members {
            println!(
                "  {}. [{}] {} <{}> {}",
                resource.order, resource.kind, resource.title, resource.url, resource.id
            );
        }
    }
}

async fn resource<T: Transport>(page: &mut AdminPage<T>, action: ResourceAction) -> anyhow::Result<()> {
    match action {
        ResourceAction::List {
            league,
            week,
            section,
            kind,
            search,
            collapse,
        } => {
            page.load::<Week>().await?;
            page.load::<Section>().await?;
            page.selection.select_league(league);
            page.selection.select_week(week);
            page.selection.select_section(section);

            let section_ids = page.resource_section_ids();
            page.load_resources(&section_ids).await?;

            let filter = ResourceFilter {
                kind,
                search,
                section_id: page.selection.section_id().map(str::to_string),
            };
            let mut expansion = SectionExpansion::default();
            for section_id in &collapse {
                expansion.toggle(section_id);
            }
            let sections = page.sections_for_selection();
            let matching = resource::filter_resources(page.lists.resources.as_slice(), &filter);
            print_resource_groups(&sections, &matching, &expansion);
        }
        ResourceAction::Create {
            section,
            title,
            url,
            kind,
            order,
        } => {
            page.selection.select_section(section);
            let draft = ResourceDraft {
                title,
                url,
                kind,
                order,
                ..ResourceDraft::in_section(page.selection.section_id())
            };
            let resource = create(page, draft).await?;
            println!("Created resource {} ({}).", resource.title, resource.id);
        }
        ResourceAction::Update {
            id,
            section,
            title,
            url,
            kind,
            order,
        } => {
            page.load_resources(&[section]).await?;
            let resource = edit(page, &id, |draft: &mut ResourceDraft| {
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(url) = url {
                    draft.url = url;
                }
                if let Some(kind) = kind {
                    draft.kind = kind;
                }
                if let Some(order) = order {
                    draft.order = order;
                }
            })
            .await?;
            println!("Updated resource {}.", resource.title);
        }
        ResourceAction::Delete { id, section, yes } => {
            page.load_resources(&[section]).await?;
            delete::<T, Resource>(page, &id, yes).await?;
        }
    }
    Ok(())
}

async fn assignment<T: Transport>(
    page: &mut AdminPage<T>,
    action: AssignmentAction,
) -> anyhow::Result<()> {
    match action {
        AssignmentAction::List { league, submissions } => {
            page.load_assignments(&[league]).await?;
            let now = Utc::now();
            for assignment in page.lists.assignments.as_slice() {
                print_assignment(assignment, now, submissions);
            }
        }
        AssignmentAction::Create {
            league,
            title,
            description,
            due,
        } => {
            let draft = AssignmentDraft {
                title,
                description,
                league_id: league,
                due_date: due,
            };
            let assignment = create(page, draft).await?;
            print_assignment(&assignment, Utc::now(), false);
        }
        AssignmentAction::Update {
            id,
            league,
            title,
            description,
            due,
        } => {
            page.load_assignments(&[league]).await?;
            let assignment = edit(page, &id, |draft: &mut AssignmentDraft| {
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if let Some(due) = due {
                    draft.due_date = due;
                }
            })
            .await?;
            print_assignment(&assignment, Utc::now(), false);
        }
        AssignmentAction::Delete { id, league, yes } => {
            page.load_assignments(&[league]).await?;
            delete::<T, Assignment>(page, &id, yes).await?;
        }
    }
    Ok(())
}

fn print_assignment(assignment: &Assignment, now: chrono::DateTime<Utc>, submissions: bool) {
    let status = due::due_date_status(assignment.due_date, now);
    let due = assignment
        .due_date
        .map_or_else(|| "no due date".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string());
    println!(
        "- {} [{}] due {} ({} submissions) {}",
        assignment.title,
        status,
        due,
        assignment.submissions.len(),
        assignment.id
    );
    if submissions {
        for submission in &assignment.submissions {
            let who = submission
                .user
                .as_ref()
                .map(|user| user.name.as_str())
                .or(submission.user_id.as_deref())
                .unwrap_or("unknown");
            let when = submission
                .submitted_at
                .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string());
            println!(
                "    {} on {} ({})",
                who,
                when,
                submission.status.as_deref().unwrap_or("submitted")
            );
        }
    }
}

async fn user<T: Transport>(page: &mut AdminPage<T>, action: UserAction) -> anyhow::Result<()> {
    page.load_users().await?;
    let changed = match action {
        UserAction::List {
            role,
            status,
            search,
        } => {
            let filter = UserFilter {
                role,
                status,
                search,
            };
            let counts = users::count_by_status(page.lists.users.as_slice());
            println!(
                "{} members: {} pending, {} active, {} suspended",
                counts.total, counts.pending, counts.active, counts.suspended
            );
            let matching = users::filter_users(page.lists.users.as_slice(), &filter);
            if matching.is_empty() {
                println!("No users match.");
            }
            for user in matching {
                println!(
                    "- {} <{}> {} {} joined {} {}",
                    user.name,
                    user.email,
                    user.role,
                    user.status,
                    user.created_at.format("%Y-%m-%d"),
                    user.id
                );
            }
            return Ok(());
        }
        UserAction::Approve { id } => page.approve_user(&id).await?,
        UserAction::Role { id, role } => page.update_role(&id, role).await?,
        UserAction::Status { id, status } => page.update_status(&id, status).await?,
    };
    println!("{} is now {} / {}.", changed.email, changed.role, changed.status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::api::fake::FakeTransport;
    use crate::api::ApiClient;

    fn weeks() -> Value {
        json!([
            {"id": "w1", "name": "Week 1", "order": 1, "leagueId": "lg-1"},
            {"id": "w2", "name": "Week 1", "order": 1, "leagueId": "lg-2"}
        ])
    }

    fn sections() -> Value {
        json!([
            {"id": "s1", "name": "Budgets", "order": 1, "weekId": "w1"},
            {"id": "s2", "name": "Ledgers", "order": 2, "weekId": "w1"},
            {"id": "s3", "name": "Markets", "order": 1, "weekId": "w2"}
        ])
    }

    fn list_resources(league: Option<&str>, section: Option<&str>) -> ResourceAction {
        ResourceAction::List {
            league: league.map(str::to_string),
            week: None,
            section: section.map(str::to_string),
            kind: None,
            search: String::new(),
            collapse: Vec::new(),
        }
    }

    fn paths(page: &AdminPage<FakeTransport>) -> Vec<String> {
        page.api()
            .transport()
            .calls()
            .into_iter()
            .map(|call| call.path)
            .collect()
    }

    #[tokio::test]
    async fn listing_a_section_fetches_only_that_section() {
        let transport = FakeTransport::default()
            .ok(weeks())
            .ok(sections())
            .ok(json!([]));
        let mut page = AdminPage::new(ApiClient::new(transport));

        resource(&mut page, list_resources(None, Some("s1")))
            .await
            .unwrap();
        assert_eq!(
            paths(&page),
            ["/api/weeks", "/api/sections", "/api/sections/s1/resources"]
        );
    }

    #[tokio::test]
    async fn listing_a_league_fetches_sections_under_its_weeks() {
        let transport = FakeTransport::default()
            .ok(weeks())
            .ok(sections())
            .ok(json!([]))
            .ok(json!([]));
        let mut page = AdminPage::new(ApiClient::new(transport));

        resource(&mut page, list_resources(Some("lg-1"), None))
            .await
            .unwrap();
        assert_eq!(
            paths(&page),
            [
                "/api/weeks",
                "/api/sections",
                "/api/sections/s1/resources",
                "/api/sections/s2/resources"
            ]
        );
    }

    #[tokio::test]
    async fn cohort_report_only_fetches_in_cohort_content() {
        let out = std::env::temp_dir().join("openlearn-admin-cohort-report.md");
        let transport = FakeTransport::default()
            .ok(json!([
                {"id": "c1", "name": "Spring", "isActive": true},
                {"id": "c2", "name": "Autumn", "isActive": true}
            ]))
            .ok(json!([
                {"id": "lg-1", "name": "Finance", "cohortId": "c1"},
                {"id": "lg-2", "name": "Statistics", "cohortId": "c2"}
            ]))
            .ok(json!([]))
            .ok(weeks())
            .ok(sections())
            .ok(json!([]))
            .ok(json!([]))
            .ok(json!([]));
        let mut page = AdminPage::new(ApiClient::new(transport));

        let command = Commands::Report {
            cohort: Some("c1".to_string()),
            with_members: false,
            out: out.clone(),
        };
        run(&mut page, command).await.unwrap();
        assert_eq!(
            paths(&page),
            [
                "/api/cohorts",
                "/api/leagues",
                "/api/specializations",
                "/api/weeks",
                "/api/sections",
                "/api/sections/s1/resources",
                "/api/sections/s2/resources",
                "/api/assignments/league/lg-1"
            ]
        );
        let report = std::fs::read_to_string(&out).unwrap();
        assert!(report.contains("Generated for Spring"));
        let _ = std::fs::remove_file(out);
    }

    #[test]
    fn blocked_moves_are_noted_and_valid_ones_applied() {
        let mut leagues = LeagueOrder::default();
        leagues.add("a");
        leagues.add("b");

        let notes = reorder(
            &mut leagues,
            &["a".to_string(), "b".to_string()],
            &["a".to_string(), "zz".to_string()],
        );
        assert_eq!(
            notes,
            vec!["a cannot move up", "a cannot move down", "zz cannot move down"]
        );
        let order: Vec<(&str, u32)> = leagues
            .entries()
            .iter()
            .map(|entry| (entry.league_id.as_str(), entry.order))
            .collect();
        assert_eq!(order, vec![("b", 1), ("a", 2)]);
    }
}
