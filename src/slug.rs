//! URL slugs derived from display names.

/// Build a lowercase, hyphen-separated slug from `name`.
///
/// Latin letters with diacritics are folded to ASCII, `@` becomes `at`,
/// whitespace, `-` and `_` separate words, and every other character is
/// dropped. The result only contains `[a-z0-9-]` with no leading, trailing or
/// doubled hyphens, so slugifying a slug returns it unchanged.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut gap = false;

    for ch in name.chars() {
        if ch == '@' {
            gap = true;
            push_word(&mut slug, &mut gap, "at");
            gap = true;
            continue;
        }
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            gap = true;
            continue;
        }
        for lower in ch.to_lowercase() {
            if lower.is_ascii_alphanumeric() {
                let mut buf = [0u8; 4];
                push_word(&mut slug, &mut gap, lower.encode_utf8(&mut buf));
            } else if let Some(ascii) = fold(lower) {
                push_word(&mut slug, &mut gap, ascii);
            }
        }
    }

    slug
}

fn push_word(slug: &mut String, gap: &mut bool, text: &str) {
    if *gap && !slug.is_empty() {
        slug.push('-');
    }
    *gap = false;
    slug.push_str(text);
}

fn fold(ch: char) -> Option<&'static str> {
    let ascii = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ą' | 'ă' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' | 'ĉ' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'ğ' | 'ĝ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ß' => "ss",
        'ś' | 'š' | 'ş' => "s",
        'ť' | 'ţ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(ascii)
}
