/// Sequencing-file extensions removed from sample headers
const STRIPPED_EXTENSIONS: [&str; 2] = [".fastq", ".FASTQ"];

/// Derive short, unique display names from sample column headers.
///
/// MitoFish sample headers are usually file names of the form
/// `<replicate>-<run>-<site...>-<volume>.fastq`. These become `<site>-<replicate>`:
///
/// ```
/// use mitofish_viz::parsing::sample_names::clean_sample_names;
///
/// let names = clean_sample_names(&[
///     "1-1-tamagawa-6000.fastq",
///     "2-1-tamagawa-6000.fastq",
///     "x-2-nikaryo-yosui-500.fastq",
/// ]);
/// assert_eq!(names, vec!["tamagawa-1", "tamagawa-2", "nikaryo-yosui"]);
/// ```
///
/// Only headers that carried a sequencing-file extension are rewritten. Plain
/// headers, including names this function already produced, are kept as is, as
/// are headers with fewer than three dash-separated parts once the extension is
/// removed. Repeated names get `_2`, `_3`, ... suffixes.
#[must_use]
pub fn clean_sample_names<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(headers.len());

    for header in headers {
        let base = clean_one(header.as_ref());

        let mut name = base.clone();
        let mut counter = 1;
        while cleaned.contains(&name) {
            counter += 1;
            name = format!("{base}_{counter}");
        }
        cleaned.push(name);
    }

    cleaned
}

fn clean_one(header: &str) -> String {
    let name = STRIPPED_EXTENSIONS
        .iter()
        .fold(header.to_string(), |acc, ext| acc.replace(ext, ""));
    if name == header {
        return name;
    }

    let parts: Vec<&str> = name.split('-').collect();
    if parts.len() < 3 {
        return name;
    }

    let site = if parts.len() > 3 {
        parts[2..parts.len() - 1].join("-")
    } else {
        parts[2].to_string()
    };

    let replicate = parts[0];
    if !replicate.is_empty() && replicate.chars().all(|c| c.is_ascii_digit()) {
        format!("{site}-{replicate}")
    } else {
        site
    }
}
