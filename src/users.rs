use crate::models::{Role, User, UserStatus};

/// Grand pathfinders are never listed, counted or editable from the admin views.
pub fn is_visible(user: &User) -> bool {
    user.role != Role::GrandPathfinder
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub search: String,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if !is_visible(user) {
            return false;
        }
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        if self.status.is_some_and(|status| status != user.status) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || user.name.to_lowercase().contains(&needle)
            || user.email.to_lowercase().contains(&needle)
    }
}

/// Matching users, newest first.
pub fn filter_users<'a>(users: &'a [User], filter: &UserFilter) -> Vec<&'a User> {
    let mut matching: Vec<&User> = users.iter().filter(|user| filter.matches(user)).collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matching
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub active: usize,
    pub suspended: usize,
}

pub fn count_by_status(users: &[User]) -> StatusCounts {
    users
        .iter()
        .filter(|user| is_visible(user))
        .fold(StatusCounts::default(), |mut counts, user| {
            counts.total += 1;
            match user.status {
                UserStatus::Pending => counts.pending += 1,
                UserStatus::Active => counts.active += 1,
                UserStatus::Suspended => counts.suspended += 1,
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn user(id: &str, role: Role, status: UserStatus, age_days: i64) -> User {
        let base = Utc.with_ymd_and_hms(2026, 1, 31, 9, 0, 0).unwrap();
        User {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@openlearn.example"),
            role,
            status,
            created_at: base - Duration::days(age_days),
        }
    }

    fn roster() -> Vec<User> {
        vec![
            user("ada", Role::Pioneer, UserStatus::Pending, 3),
            user("grace", Role::GrandPathfinder, UserStatus::Active, 1),
            user("linus", Role::Pathfinder, UserStatus::Active, 2),
            user("root", Role::GrandPathfinder, UserStatus::Pending, 0),
            user("ken", Role::ChiefPathfinder, UserStatus::Suspended, 9),
        ]
    }

    #[test]
    fn grand_pathfinders_never_appear() {
        let users = roster();
        let filters = [
            UserFilter::default(),
            UserFilter {
                role: Some(Role::GrandPathfinder),
                ..UserFilter::default()
            },
            UserFilter {
                status: Some(UserStatus::Pending),
                ..UserFilter::default()
            },
            UserFilter {
                search: "grace".to_string(),
                ..UserFilter::default()
            },
        ];
        for filter in &filters {
            assert!(filter_users(&users, filter)
                .iter()
                .all(|u| u.role != Role::GrandPathfinder));
        }
        assert!(filter_users(&users, &filters[1]).is_empty());
    }

    #[test]
    fn counts_skip_hidden_users() {
        let counts = count_by_status(&roster());
        assert_eq!(
            counts,
            StatusCounts {
                total: 3,
                pending: 1,
                active: 1,
                suspended: 1,
            }
        );
    }

    #[test]
    fn newest_first_with_search_over_email() {
        let users = roster();
        let all: Vec<&str> = filter_users(&users, &UserFilter::default())
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(all, vec!["linus", "ada", "ken"]);

        let filter = UserFilter {
            search: "KEN@".to_string(),
            ..UserFilter::default()
        };
        assert_eq!(filter_users(&users, &filter).len(), 1);
    }
}
