//! Icon identifiers understood by the launcher grid.
//!
//! Shortcuts store their icon as a free-form string. Resolution to something
//! drawable happens here, at the presentation boundary: a known identifier
//! maps to its [`IconId`], anything else resolves to [`Icon::Fallback`].

macro_rules! icon_ids {
    ($($variant:ident => $glyph:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum IconId {
            $($variant),+
        }

        impl IconId {
            pub const ALL: &'static [IconId] = &[$(IconId::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(IconId::$variant => stringify!($variant)),+
                }
            }

            pub fn glyph(self) -> &'static str {
                match self {
                    $(IconId::$variant => $glyph),+
                }
            }
        }
    };
}

icon_ids! {
    Play       => "▶",
    Download   => "⇩",
    FolderOpen => "▤",
    Terminal   => ">_",
    Settings   => "⚙",
    Globe      => "◍",
    Database   => "◫",
    Server     => "▦",
    Monitor    => "▭",
    Cpu        => "▣",
    HardDrive  => "▬",
    Wifi       => "≋",
    Film       => "▞",
    Music      => "♪",
    Image      => "▨",
    FileText   => "≣",
    Archive    => "▥",
    Shield     => "◈",
    Lock       => "▲",
    Key        => "⚷",
    Cloud      => "☁",
    Smartphone => "▯",
    Tablet     => "▢",
    Camera     => "◉",
}

pub const FALLBACK_NAME: &str = "Square";
const FALLBACK_GLYPH: &str = "■";

impl IconId {
    /// Exact, case-sensitive lookup by identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|icon| icon.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Known(IconId),
    Fallback,
}

impl Icon {
    pub fn resolve(name: &str) -> Self {
        IconId::from_name(name).map_or(Icon::Fallback, Icon::Known)
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Known(id) => id.glyph(),
            Icon::Fallback => FALLBACK_GLYPH,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Icon::Known(id) => id.name(),
            Icon::Fallback => FALLBACK_NAME,
        }
    }
}

/// Case-insensitive substring filter over the supported icons, catalog order.
pub fn search(query: &str) -> Vec<IconId> {
    let needle = query.trim().to_lowercase();
    IconId::ALL
        .iter()
        .copied()
        .filter(|icon| icon.name().to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_and_unknown_names() {
        assert_eq!(Icon::resolve("Terminal"), Icon::Known(IconId::Terminal));
        assert_eq!(Icon::resolve("terminal"), Icon::Fallback);
        assert_eq!(Icon::resolve("Rocket").name(), FALLBACK_NAME);
        assert_eq!(Icon::resolve("").glyph(), FALLBACK_GLYPH);
    }

    #[test]
    fn catalog_has_twenty_four_distinct_names() {
        assert_eq!(IconId::ALL.len(), 24);
        for icon in IconId::ALL {
            assert_eq!(IconId::from_name(icon.name()), Some(*icon));
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        assert_eq!(search("drive"), vec![IconId::HardDrive]);
        assert_eq!(search("FOLDER"), vec![IconId::FolderOpen]);
        assert_eq!(search("").len(), IconId::ALL.len());
        assert!(search("zzz").is_empty());
        assert_eq!(search("m"), vec![
            IconId::Terminal,
            IconId::Monitor,
            IconId::Film,
            IconId::Music,
            IconId::Image,
            IconId::Smartphone,
            IconId::Camera,
        ]);
    }
}
