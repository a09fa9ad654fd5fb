//! Sidebar menu generation.
//!
//! Controllers declare their sidebar as data; the generator resolves URLs,
//! filters hidden entries, and marks the active heading and item for the
//! current request. The host renders the resulting structure.

/// Declared sidebar child link.
#[derive(Debug, Clone, Default)]
pub struct MenuChild {
    /// Language key shown as the link label.
    pub lang_key: String,
    pub url: String,
    /// Edit link rendered when the parent list is a folder list.
    pub manage_url: Option<String>,
    pub cannot_remove: bool,
}

/// Declared sidebar section.
#[derive(Debug, Clone, Default)]
pub struct MenuSection {
    pub title: String,
    pub url: Option<String>,
    /// Optional heading button: `(title, url)`.
    pub button: Option<(String, String)>,
    /// Render children as a named folder list instead of a basic list.
    pub folder_name: Option<String>,
    pub children: Vec<MenuChild>,
}

/// Generated sidebar item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub title: String,
    pub url: String,
    pub active: bool,
    pub edit_url: Option<String>,
    pub removable: bool,
}

/// Generated child list under a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarList {
    pub folder_name: Option<String>,
    pub items: Vec<SidebarItem>,
}

/// Generated sidebar heading.
#[derive(Debug, Clone)]
pub struct SidebarHeading {
    pub title: String,
    pub url: Option<String>,
    pub button: Option<(String, String)>,
    pub active: bool,
    pub list: Option<SidebarList>,
}

/// The generated sidebar.
#[derive(Debug, Clone, Default)]
pub struct Sidebar {
    pub headings: Vec<SidebarHeading>,
}

/// Build a sidebar from declared sections.
///
/// `active_path` marks the active heading/item; `current_path` is the
/// controller (and optionally action) path of the request, controlling
/// which section's children are expanded; `hidden` entries are skipped by
/// language key. URLs are resolved through `make_url`.
pub fn generate_sidebar(
    sections: &[MenuSection],
    active_path: Option<&str>,
    current_path: &str,
    hidden: &[String],
    make_url: impl Fn(&str) -> String,
) -> Sidebar {
    let mut sidebar = Sidebar::default();

    for section in sections {
        let section_url = section.url.as_deref();

        let mut heading = SidebarHeading {
            title: section.title.clone(),
            url: section_url.map(&make_url),
            button: section
                .button
                .as_ref()
                .map(|(title, url)| (title.clone(), make_url(url))),
            active: section_url.is_some() && section_url == active_path,
            list: None,
        };

        // Children only expand under the section currently being viewed.
        let expanded = section_url.is_some_and(|url| {
            url == current_path
                || current_path
                    .split_once('/')
                    .is_some_and(|(controller, _)| url == controller)
        });

        if expanded && !section.children.is_empty() {
            let items: Vec<SidebarItem> = section
                .children
                .iter()
                .filter(|child| !hidden.contains(&child.lang_key))
                .map(|child| SidebarItem {
                    title: child.lang_key.clone(),
                    url: make_url(&child.url),
                    active: active_path == Some(child.url.as_str()),
                    edit_url: section
                        .folder_name
                        .as_ref()
                        .and(child.manage_url.as_ref())
                        .map(|url| make_url(url)),
                    removable: !child.cannot_remove,
                })
                .collect();

            if !items.is_empty() {
                heading.list = Some(SidebarList {
                    folder_name: section.folder_name.clone(),
                    items,
                });
            }
        }

        sidebar.headings.push(heading);
    }

    sidebar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Vec<MenuSection> {
        vec![
            MenuSection {
                title: "Categories".into(),
                url: Some("categories".into()),
                button: Some(("New".into(), "categories/edit/0".into())),
                folder_name: None,
                children: vec![
                    MenuChild {
                        lang_key: "nav_all_categories".into(),
                        url: "categories".into(),
                        ..Default::default()
                    },
                    MenuChild {
                        lang_key: "nav_hidden".into(),
                        url: "categories/hidden".into(),
                        ..Default::default()
                    },
                ],
            },
            MenuSection {
                title: "Settings".into(),
                url: Some("settings".into()),
                button: None,
                folder_name: Some("setting-pages".into()),
                children: vec![MenuChild {
                    lang_key: "nav_general".into(),
                    url: "settings/general".into(),
                    manage_url: Some("settings/general/manage".into()),
                    cannot_remove: true,
                }],
            },
        ]
    }

    fn url(page: &str) -> String {
        format!("addons/settings/publisher/{}", page)
    }

    #[test]
    fn headings_resolve_urls_and_buttons() {
        let sidebar = generate_sidebar(&menu(), None, "", &[], url);

        assert_eq!(sidebar.headings.len(), 2);
        assert_eq!(
            sidebar.headings[0].url.as_deref(),
            Some("addons/settings/publisher/categories")
        );
        assert_eq!(
            sidebar.headings[0].button.as_ref().unwrap().1,
            "addons/settings/publisher/categories/edit/0"
        );
    }

    #[test]
    fn active_heading_matches_active_path() {
        let sidebar = generate_sidebar(&menu(), Some("categories"), "", &[], url);

        assert!(sidebar.headings[0].active);
        assert!(!sidebar.headings[1].active);
    }

    #[test]
    fn children_expand_only_for_current_section() {
        let sidebar = generate_sidebar(&menu(), None, "categories", &[], url);

        assert!(sidebar.headings[0].list.is_some());
        assert!(sidebar.headings[1].list.is_none());
    }

    #[test]
    fn current_path_with_action_still_expands() {
        let sidebar = generate_sidebar(&menu(), None, "categories/edit", &[], url);

        assert!(sidebar.headings[0].list.is_some());
    }

    #[test]
    fn hidden_children_are_filtered() {
        let hidden = vec!["nav_hidden".to_string()];
        let sidebar = generate_sidebar(&menu(), None, "categories", &hidden, url);

        let list = sidebar.headings[0].list.as_ref().unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].title, "nav_all_categories");
    }

    #[test]
    fn active_item_matches_active_path() {
        let sidebar = generate_sidebar(&menu(), Some("categories"), "categories", &[], url);

        let list = sidebar.headings[0].list.as_ref().unwrap();
        assert!(list.items[0].active);
    }

    #[test]
    fn folder_lists_carry_edit_urls_and_removability() {
        let sidebar = generate_sidebar(&menu(), None, "settings/general", &[], url);

        let list = sidebar.headings[1].list.as_ref().unwrap();
        assert_eq!(list.folder_name.as_deref(), Some("setting-pages"));
        assert_eq!(
            list.items[0].edit_url.as_deref(),
            Some("addons/settings/publisher/settings/general/manage")
        );
        assert!(!list.items[0].removable);
    }
}
