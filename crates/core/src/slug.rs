//! Slug generation for categories and genres created without an explicit slug.

/// Longest slug [`slugify`] produces.
pub const MAX_GENERATED_SLUG_LENGTH: usize = 100;

/// Transliteration of a lowercase Cyrillic letter, if it is one.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

/// Derive a URL slug from a display name.
///
/// Cyrillic is transliterated, ASCII letters are lowercased, digits and `_`
/// are kept, and every other run of characters becomes a single `-`. The
/// result never starts or ends with `-` and is at most
/// [`MAX_GENERATED_SLUG_LENGTH`] characters long. May return an empty string
/// when the name contains nothing sluggable.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let piece: Option<String> = if c.is_ascii_alphanumeric() || c == '_' {
            Some(c.to_string())
        } else {
            transliterate(c).map(str::to_string)
        };

        match piece {
            Some(p) if p.is_empty() => {}
            Some(p) => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push_str(&p);
            }
            None => pending_dash = true,
        }
    }

    if slug.len() > MAX_GENERATED_SLUG_LENGTH {
        slug.truncate(MAX_GENERATED_SLUG_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_name_is_lowercased_and_dashed() {
        assert_eq!(slugify("Science Fiction"), "science-fiction");
        assert_eq!(slugify("  Rock & Roll!! "), "rock-roll");
    }

    #[test]
    fn cyrillic_is_transliterated() {
        assert_eq!(slugify("Фантастика"), "fantastika");
        assert_eq!(slugify("Щука и ёж"), "schuka-i-yozh");
        assert_eq!(slugify("Объект"), "obekt");
    }

    #[test]
    fn underscores_and_digits_survive() {
        assert_eq!(slugify("top_10 films"), "top_10-films");
    }

    #[test]
    fn nothing_sluggable_gives_empty() {
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn long_names_are_truncated() {
        let name = "a ".repeat(80);
        let slug = slugify(&name);
        assert!(slug.len() <= MAX_GENERATED_SLUG_LENGTH);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn generated_slug_passes_slug_validation() {
        let slug = slugify("Детектив Noir");
        assert!(crate::validation::check_slug(&slug).is_ok());
    }
}
