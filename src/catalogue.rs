//! C2 — Post Catalogue: per-day post set (weekday vs weekend lists, plus
//! synthesised `clinic:<unit>` posts on weekday clinic days); distinguishes
//! on-call posts from clinic posts.

use crate::domain::{PostKind, Unit, STANDBY_ONCALL};
use std::collections::HashSet;

pub struct PostCatalogue {
    /// Caller-supplied weekday posts plus one synthetic `clinic:<unit>` per unit.
    pub posts_weekday: Vec<String>,
    /// Caller-supplied weekend posts, used verbatim.
    pub posts_weekend: Vec<String>,
    /// `(posts_weekday ∪ posts_weekend) − {clinic:*}` — the set doing duty
    /// for rest/spacing/category-penalty logic. Computed as an explicit
    /// set-difference (not a prefix test at the call sites), matching
    /// `prime_scheduler_wrapper.py` lines 117-118.
    pub oncall_posts: HashSet<String>,
}

impl PostCatalogue {
    pub fn build(posts_weekday: &[String], posts_weekend: &[String], units: &[Unit]) -> Self {
        let mut posts_weekday: Vec<String> = posts_weekday.to_vec();
        for unit in units {
            let clinic_post = PostKind::clinic_name(&unit.name);
            if !posts_weekday.contains(&clinic_post) {
                posts_weekday.push(clinic_post);
            }
        }
        let posts_weekend = posts_weekend.to_vec();

        let clinic_names: HashSet<String> = units.iter().map(|u| PostKind::clinic_name(&u.name)).collect();
        let oncall_posts: HashSet<String> = posts_weekday
            .iter()
            .chain(posts_weekend.iter())
            .filter(|p| !clinic_names.contains(*p))
            .cloned()
            .collect();

        Self {
            posts_weekday,
            posts_weekend,
            oncall_posts,
        }
    }

    /// The post list in effect on a given weekday (0=Mon..6=Sun).
    pub fn posts_for_weekday(&self, weekday: u8) -> &[String] {
        if weekday >= 5 {
            &self.posts_weekend
        } else {
            &self.posts_weekday
        }
    }

    pub fn is_oncall(&self, post: &str) -> bool {
        self.oncall_posts.contains(post)
    }

    /// On-call posts whose name matches none of the category-penalty
    /// prefix conventions (`Ward*`, `ED*`, `Registrar*`) and isn't
    /// `Standby Oncall` — the category penalties in §4.5 silently skip
    /// these. Surfaced by the reporter per SPEC_FULL.md §9's resolution
    /// of the "post_role tag" open question: prefix matching is kept, but
    /// audited.
    pub fn unrecognised_posts(&self) -> Vec<&str> {
        let mut posts: Vec<&str> = self
            .oncall_posts
            .iter()
            .map(String::as_str)
            .filter(|p| *p != STANDBY_ONCALL && !p.starts_with("Ward") && !p.starts_with("ED") && !p.starts_with("Registrar"))
            .collect();
        posts.sort_unstable();
        posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, clinic_days: &[u8]) -> Unit {
        Unit {
            id: name.to_string(),
            name: name.to_string(),
            clinic_days: clinic_days.to_vec(),
        }
    }

    #[test]
    fn synthesises_one_clinic_post_per_unit() {
        let units = vec![unit("U1", &[0, 4]), unit("U2", &[1, 3])];
        let cat = PostCatalogue::build(&["ED1".to_string(), "Ward3".to_string()], &["ED1".to_string()], &units);
        assert!(cat.posts_weekday.contains(&"clinic:U1".to_string()));
        assert!(cat.posts_weekday.contains(&"clinic:U2".to_string()));
        assert!(!cat.posts_weekend.contains(&"clinic:U1".to_string()));
    }

    #[test]
    fn oncall_posts_excludes_clinic_posts_only() {
        let units = vec![unit("U1", &[0])];
        let cat = PostCatalogue::build(
            &["ED1".to_string()],
            &["ED1".to_string(), "Standby Oncall".to_string()],
            &units,
        );
        assert!(cat.is_oncall("ED1"));
        assert!(cat.is_oncall("Standby Oncall"));
        assert!(!cat.is_oncall("clinic:U1"));
    }

    #[test]
    fn unrecognised_posts_flags_names_outside_the_prefix_conventions() {
        let units = vec![];
        let cat = PostCatalogue::build(
            &["ED1".to_string(), "Ward3".to_string(), "Float Pool".to_string()],
            &["Standby Oncall".to_string()],
            &units,
        );
        assert_eq!(cat.unrecognised_posts(), vec!["Float Pool"]);
    }
}
