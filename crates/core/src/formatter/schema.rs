//! Static parts of every formatted config.

use super::types::{
    Category, CategoryTable, FieldFilter, FieldRule, ListRule, TorrentFields, TorrentRules,
};

/// Namespace prefix of derived internal ids.
pub const ID_PREFIX: &str = "jackett_";
/// Prefix of the display name.
pub const NAME_PREFIX: &str = "[Jackett] ";

pub const ENCODING: &str = "UTF-8";
pub const LANGUAGE: &str = "zh_CN";

/// Torznab search endpoint of one indexer, relative to the host.
pub fn torznab_path(indexer_id: &str) -> String {
    format!(
        "/api/v2.0/indexers/{}/results/torznab",
        urlencoding::encode(indexer_id)
    )
}

const MOVIE_CATEGORIES: &[(&str, &str)] = &[
    ("2000", "Movies"),
    ("2010", "Movies/Foreign"),
    ("2020", "Movies/BluRay"),
    ("2030", "Movies/DVD"),
    ("2040", "Movies/HD"),
    ("2045", "Movies/UHD"),
    ("2050", "Movies/3D"),
    ("2060", "Movies/SD"),
];

const TV_CATEGORIES: &[(&str, &str)] = &[
    ("5000", "TV"),
    ("5020", "TV/Blu-ray"),
    ("5030", "TV/DVD"),
    ("5040", "TV/HD"),
    ("5050", "TV/SD"),
    ("5060", "TV/Foreign"),
    ("5070", "TV/Sport"),
];

fn categories(table: &[(&str, &str)]) -> Vec<Category> {
    table
        .iter()
        .map(|(id, desc)| Category {
            id: id.to_string(),
            desc: desc.to_string(),
        })
        .collect()
}

pub fn category_table() -> CategoryTable {
    CategoryTable {
        movie: categories(MOVIE_CATEGORIES),
        tv: categories(TV_CATEGORIES),
    }
}

/// Selectors for Jackett's Torznab `<item>` elements.
pub fn torznab_rules() -> TorrentRules {
    let peers = |attr: &str| {
        FieldRule::selector(&format!("torznab:attr[name={}]", attr))
            .filter(FieldFilter::regex(r"(\d+)", 1))
            .default_value("0")
    };

    TorrentRules {
        list: ListRule {
            selector: "item".to_string(),
        },
        fields: TorrentFields {
            title: FieldRule::selector("title"),
            details: FieldRule::selector("guid"),
            download: FieldRule::selector("link"),
            size: FieldRule::selector("size"),
            date_added: FieldRule::selector("pubDate").optional(),
            seeders: peers("seeders"),
            leechers: peers("peers"),
            downloadvolumefactor: FieldRule::constant(0),
            uploadvolumefactor: FieldRule::constant(1),
        },
    }
}
