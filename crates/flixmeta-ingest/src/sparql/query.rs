//! SPARQL query construction
//!
//! A lookup asks Wikidata for a film whose search-indexed label matches the
//! catalog title and whose release date falls in the catalog year. Genre and
//! director are optional joins, so a film without them still matches.
//!
//! Release dates are matched in order of preference: a date qualified with the
//! reference country, then a date with no country qualifier at all. Dates
//! qualified with any other country never match.

/// Wikidata item for "film"
const FILM_CLASS: &str = "wd:Q11424";

/// Default reference country for release dates (United States)
pub const DEFAULT_RELEASE_COUNTRY: &str = "Q30";

pub const DEFAULT_LANGUAGE: &str = "en";

/// Knobs for the generated query text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Language used for entity search and for every label
    pub language: String,

    /// Wikidata item id of the country whose release date is preferred
    pub release_country: String,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            release_country: DEFAULT_RELEASE_COUNTRY.to_string(),
        }
    }
}

/// Build the lookup query for `title` released in `year` using default options.
pub fn build_query(title: &str, year: i32) -> String {
    build_query_with(&QueryOptions::default(), title, year)
}

/// Build the lookup query for `title` released in `year`.
///
/// The title is escaped as a SPARQL string literal, so quotes, backslashes and
/// line breaks in catalog titles cannot break the query.
pub fn build_query_with(options: &QueryOptions, title: &str, year: i32) -> String {
    let title = escape_literal(title);
    let lang = escape_literal(&options.language);
    let country = &options.release_country;

    format!(
        r#"SELECT * WHERE {{
    SERVICE wikibase:mwapi {{
        bd:serviceParam wikibase:api "EntitySearch" ;
                        wikibase:endpoint "www.wikidata.org" ;
                        mwapi:search "{title}" ;
                        mwapi:language "{lang}" .
        ?item wikibase:apiOutputItem mwapi:item .
    }}

    ?item wdt:P31/wdt:P279* {FILM_CLASS} .

    {{
        ?item p:P577 ?releaseDateStatement .
        ?releaseDateStatement ps:P577 ?releaseDate .
        ?releaseDateStatement pq:P291 wd:{country} .
    }}
    UNION
    {{
        ?item p:P577 ?releaseDateStatement .
        ?releaseDateStatement ps:P577 ?releaseDate .
        FILTER NOT EXISTS {{ ?releaseDateStatement pq:P291 ?country }}
    }}

    FILTER (YEAR(?releaseDate) = {year}) .

    ?item rdfs:label ?itemLabel .
    FILTER (lang(?itemLabel) = "{lang}") .

    OPTIONAL {{
        ?item wdt:P136 ?genre .
        ?genre rdfs:label ?genreLabel .
        FILTER (lang(?genreLabel) = "{lang}") .
    }}

    OPTIONAL {{
        ?item wdt:P57 ?director .
        ?director rdfs:label ?directorLabel .
        FILTER (lang(?directorLabel) = "{lang}") .
    }}

    SERVICE wikibase:label {{ bd:serviceParam wikibase:language "{lang}" . }}
}}
"#
    )
}

/// Escape `value` for use inside a double-quoted SPARQL string literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_is_deterministic() {
        assert_eq!(build_query("Dinosaur Planet", 2003), build_query("Dinosaur Planet", 2003));
    }

    #[test]
    fn test_build_query_interpolates_title_and_year() {
        let query = build_query("Dinosaur Planet", 2003);

        assert!(query.contains(r#"mwapi:search "Dinosaur Planet" ;"#));
        assert!(query.contains("FILTER (YEAR(?releaseDate) = 2003)"));
        assert!(query.contains("pq:P291 wd:Q30 ."));
        assert!(query.contains(r#"mwapi:language "en" ."#));
    }

    #[test]
    fn test_genre_and_director_are_optional() {
        let query = build_query("Heat", 1995);

        let optional_blocks = query.matches("OPTIONAL {").count();
        assert_eq!(optional_blocks, 2);
        assert!(query.contains("?genreLabel"));
        assert!(query.contains("?directorLabel"));
    }

    #[test]
    fn test_title_quotes_are_escaped() {
        let query = build_query(r#"The "Best" Movie \ Ever"#, 2001);

        assert!(query.contains(r#"mwapi:search "The \"Best\" Movie \\ Ever" ;"#));
    }

    #[test]
    fn test_custom_options() {
        let options = QueryOptions {
            language: "fr".to_string(),
            release_country: "Q142".to_string(),
        };
        let query = build_query_with(&options, "Amélie", 2001);

        assert!(query.contains("pq:P291 wd:Q142 ."));
        assert!(query.contains(r#"FILTER (lang(?genreLabel) = "fr")"#));
        assert!(query.contains(r#"mwapi:search "Amélie" ;"#));
    }

    #[test]
    fn test_escape_literal_control_characters() {
        assert_eq!(escape_literal("a\nb\tc\r"), "a\\nb\\tc\\r");
        assert_eq!(escape_literal("plain"), "plain");
    }
}
