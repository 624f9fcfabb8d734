//! Resolves which page section is "current" for a scroll offset and keeps
//! nav-link highlighting in sync with it.

#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl Region {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub id: String,
    pub active: bool,
}

/// `"#contact"` -> `"contact"`. Links that do not point inside the page
/// yield `None`.
pub fn section_id_from_href(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Last region (in iteration order) whose top, minus `margin`, is at or
/// above `offset`. `None` while the viewport sits above every region.
pub fn current_region(offset: f64, regions: &[Region], margin: f64) -> Option<&Region> {
    regions
        .iter()
        .filter(|region| offset >= region.top - margin)
        .last()
}

pub fn find_region<'a>(regions: &'a [Region], id: &str) -> Option<&'a Region> {
    regions.iter().find(|region| region.id == id)
}

/// Document offset to scroll to so `region_top` lands just below a header
/// of height `margin`.
pub fn scroll_target(region_top: f64, margin: f64) -> f64 {
    (region_top - margin).max(0.0)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activation {
    pub active: Option<String>,
    pub changed: bool,
}

/// Owns one set of nav links. The desktop menu and the floating mobile
/// nav each get their own resolver over the same regions.
#[derive(Clone, Debug)]
pub struct SectionResolver {
    margin: f64,
    links: Vec<NavLink>,
    active: Option<String>,
}

impl SectionResolver {
    pub fn new<I, S>(margin: f64, link_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            margin,
            links: link_ids
                .into_iter()
                .map(|id| NavLink {
                    id: id.into(),
                    active: false,
                })
                .collect(),
            active: None,
        }
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// Id of the highlighted link, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active() == Some(id)
    }

    pub fn reset(&mut self) {
        self.active = None;
        for link in self.links.iter_mut() {
            link.active = false;
        }
    }

    /// Resolves the current region for `offset` and moves the highlight to
    /// the matching link in a single pass. At most one link is active
    /// afterwards; none when no region qualifies or the region has no link.
    pub fn resolve(&mut self, offset: f64, regions: &[Region]) -> Activation {
        let current = current_region(offset, regions, self.margin).map(|region| region.id.as_str());

        let mut next_active = None;
        for link in self.links.iter_mut() {
            link.active = next_active.is_none() && Some(link.id.as_str()) == current;
            if link.active {
                next_active = Some(link.id.clone());
            }
        }

        let changed = next_active != self.active;
        self.active = next_active.clone();

        Activation {
            active: next_active,
            changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARGIN: f64 = 80.0;

    fn page() -> Vec<Region> {
        vec![
            Region::new("home", 0.0, 700.0),
            Region::new("about", 700.0, 600.0),
            Region::new("practice", 1_300.0, 900.0),
            Region::new("team", 2_200.0, 800.0),
            Region::new("contact", 3_000.0, 700.0),
        ]
    }

    fn resolver() -> SectionResolver {
        SectionResolver::new(MARGIN, ["home", "about", "practice", "team", "contact"])
    }

    #[test]
    fn boundary_offset_activates_region() {
        let regions = page();
        let mut resolver = resolver();

        let activation = resolver.resolve(700.0 - MARGIN, &regions);
        assert_eq!(activation.active.as_deref(), Some("about"));
        assert!(activation.changed);

        let activation = resolver.resolve(700.0 - MARGIN - 1.0, &regions);
        assert_eq!(activation.active.as_deref(), Some("home"));
    }

    #[test]
    fn nothing_is_active_above_the_first_region() {
        let regions = vec![Region::new("about", 500.0, 400.0)];
        let mut resolver = SectionResolver::new(MARGIN, ["about"]);

        let activation = resolver.resolve(100.0, &regions);
        assert_eq!(activation.active, None);
        assert!(resolver.links().iter().all(|link| !link.active));
    }

    #[test]
    fn exactly_one_link_is_active_once_a_region_qualifies() {
        let regions = page();
        let mut resolver = resolver();

        for offset in (0..3_800).step_by(37) {
            resolver.resolve(offset as f64, &regions);
            let active = resolver.links().iter().filter(|link| link.active).count();
            assert_eq!(active, 1, "offset {offset} should highlight one link");
        }
    }

    #[test]
    fn highlight_only_moves_forward_while_scrolling_down() {
        let regions = page();
        let mut resolver = resolver();
        let order: Vec<&str> = regions.iter().map(|region| region.id.as_str()).collect();
        let mut last_index = 0;

        for offset in 0..4_000 {
            resolver.resolve(offset as f64, &regions);
            let active = resolver.active().expect("first region starts at the top");
            let index = order
                .iter()
                .position(|id| *id == active)
                .expect("active id is a region");
            assert!(index >= last_index, "highlight moved backwards at {offset}");
            last_index = index;
        }
        assert_eq!(resolver.active(), Some("contact"));
    }

    #[test]
    fn unchanged_region_reports_no_change() {
        let regions = page();
        let mut resolver = resolver();

        assert!(resolver.resolve(800.0, &regions).changed);
        assert!(!resolver.resolve(810.0, &regions).changed);
        assert!(resolver.is_active("about"));
    }

    #[test]
    fn region_without_link_clears_highlight() {
        let regions = page();
        let mut resolver = SectionResolver::new(MARGIN, ["about", "contact"]);

        resolver.resolve(800.0, &regions);
        let activation = resolver.resolve(1_500.0, &regions);
        assert_eq!(activation.active, None);
        assert!(activation.changed);
    }

    #[test]
    fn identical_tops_pick_the_later_region() {
        let regions = vec![Region::new("a", 100.0, 0.0), Region::new("b", 100.0, 50.0)];

        let current = current_region(100.0, &regions, 0.0).expect("both qualify");
        assert_eq!(current.id, "b");
    }

    #[test]
    fn reset_clears_every_link() {
        let regions = page();
        let mut resolver = resolver();
        resolver.resolve(2_500.0, &regions);

        resolver.reset();
        assert_eq!(resolver.active(), None);
        assert!(resolver.links().iter().all(|link| !link.active));
    }

    #[test]
    fn scroll_target_subtracts_header_and_clamps_at_top() {
        assert_eq!(scroll_target(3_000.0, MARGIN), 2_920.0);
        assert_eq!(scroll_target(40.0, MARGIN), 0.0);
    }

    #[test]
    fn hrefs_map_to_section_ids() {
        assert_eq!(section_id_from_href("#contact"), Some("contact"));
        assert_eq!(section_id_from_href("#"), None);
        assert_eq!(section_id_from_href("https://example.com"), None);
        assert_eq!(
            find_region(&page(), "team").map(|region| region.top),
            Some(2_200.0)
        );
    }
}
