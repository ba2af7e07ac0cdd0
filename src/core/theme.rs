pub const CUSTOM_THEME_ID: &str = "custom";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeOption {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

impl ThemeOption {
    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_THEME_ID
    }

    /// Label used inside the generated instruction, e.g. "science fiction".
    pub fn prompt_label(&self) -> String {
        self.title.to_lowercase()
    }
}

pub static THEMES: [ThemeOption; 4] = [
    ThemeOption {
        id: "fantasy",
        title: "Fantasy Adventure",
        description: "Create magical stories with dragons, wizards, and epic quests",
    },
    ThemeOption {
        id: "scifi",
        title: "Science Fiction",
        description: "Explore futuristic worlds with advanced technology",
    },
    ThemeOption {
        id: "mystery",
        title: "Mystery",
        description: "Craft intriguing detective stories and suspenseful plots",
    },
    ThemeOption {
        id: CUSTOM_THEME_ID,
        title: "Custom Theme",
        description: "Create your own unique story theme",
    },
];

pub fn find_theme(id: &str) -> Option<&'static ThemeOption> {
    THEMES.iter().find(|t| t.id == id)
}

/// Ready-made story elements the user can drop into the elements field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementPreset {
    pub key: &'static str,
    pub text: &'static str,
}

pub static ELEMENT_PRESETS: [ElementPreset; 4] = [
    ElementPreset {
        key: "text1",
        text: "A brave hero embarks on a quest to save their village from an ancient curse",
    },
    ElementPreset {
        key: "text2",
        text: "In a distant galaxy, a lone explorer discovers a mysterious signal",
    },
    ElementPreset {
        key: "text3",
        text: "A detective investigates a series of mysterious disappearances in a small town",
    },
    ElementPreset {
        key: "text4",
        text: "On a stormy night, a group of friends stumbles upon an old mansion with a dark secret",
    },
];

pub fn find_preset(key: &str) -> Option<&'static ElementPreset> {
    ELEMENT_PRESETS.iter().find(|p| p.key == key)
}
