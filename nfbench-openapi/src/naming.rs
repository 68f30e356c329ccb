//! Heuristics that derive NF, service and API names from free text.
//!
//! 3GPP documents do not declare which NF serves them, so the NF name is guessed from the title,
//! description, server URL and tags. The guess is best-effort: anything that does not resolve to a
//! known NF becomes [`UNKNOWN_NF`].

use nfbench_types::Method;
use nfbench_types::catalog::UNKNOWN_NF;

use crate::document::{OpenApiDocument, Server, Tag};

/// NF abbreviations that are searched for in document titles.
const TITLE_PATTERNS: &[&str] = &[
    "AUSF", "AMF", "SMF", "PCF", "UDR", "UDM", "NRF", "NSSF", "BSF", "CHF", "NEF", "AF", "UPF",
];

/// Long NF names and their abbreviations.
const LONG_NAMES: &[(&str, &str)] = &[
    ("AUTHENTICATION SERVER FUNCTION", "AUSF"),
    ("ACCESS AND MOBILITY MANAGEMENT", "AMF"),
    ("SESSION MANAGEMENT FUNCTION", "SMF"),
    ("POLICY CONTROL FUNCTION", "PCF"),
    ("UNIFIED DATA REPOSITORY", "UDR"),
    ("UNIFIED DATA MANAGEMENT", "UDM"),
    ("NETWORK REPOSITORY FUNCTION", "NRF"),
    ("NETWORK SLICE SELECTION", "NSSF"),
    ("BINDING SUPPORT FUNCTION", "BSF"),
    ("CHARGING FUNCTION", "CHF"),
    ("NETWORK EXPOSURE FUNCTION", "NEF"),
    ("APPLICATION FUNCTION", "AF"),
    ("USER PLANE FUNCTION", "UPF"),
];

/// All NF names that are accepted as a result.
const KNOWN_NFS: &[&str] = &[
    "AMF", "SMF", "UPF", "PCF", "UDM", "UDR", "AUSF", "NRF", "NSSF", "NEF", "AF", "CHF", "BSF",
    "NWDAF", "UCMF", "UDSF", "NSSAAF", "SEPP", "N3IWF", "TNGF", "W-AGF", "TWIF", "GMLC", "LMF",
    "SMSF", "5G-EIR", "SCP", "SEAF",
];

const NAME_SUFFIXES: &[&str] = &[" API", " SERVICE", "API", "SERVICE", " FUNCTION"];

/// Infers the NF that serves the document.
///
/// Candidates from the title, description, first server URL and first tag are tried in that order.
/// The first candidate that normalizes to a known NF wins, otherwise [`UNKNOWN_NF`] is returned.
pub fn infer_nf_name(document: &OpenApiDocument) -> String {
    let candidates = [
        nf_from_title(&document.info.title),
        nf_from_description(&document.info.description),
        nf_from_servers(&document.servers),
        nf_from_tags(&document.tags),
    ];

    candidates
        .iter()
        .flatten()
        .find_map(|candidate| normalize_nf_name(candidate))
        .unwrap_or(UNKNOWN_NF)
        .to_owned()
}

fn nf_from_title(title: &str) -> Option<String> {
    let title = title.trim().to_uppercase();
    if let Some(pattern) = TITLE_PATTERNS.iter().find(|p| title.contains(*p)) {
        return Some((*pattern).to_owned());
    }

    // Short all-caps first words, such as "NWDAF Analytics Info", are likely NF names.
    let first = title.split_whitespace().next()?;
    (first.len() <= 5).then(|| first.to_owned())
}

fn nf_from_description(description: &str) -> Option<String> {
    let mut words = description.split_whitespace().map(str::to_uppercase);
    let first = words.next()?;
    if first == "UNIFIED" && words.next().as_deref() == Some("DATA") {
        return Some("UDR".to_owned());
    }
    Some(first)
}

fn nf_from_servers(servers: &[Server]) -> Option<String> {
    let url = &servers.first()?.url;
    let url = match url.strip_prefix('{').and_then(|rest| rest.split_once('}')) {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => url.as_str(),
    };

    // Service names look like `nausf-auth`, where the NF follows the leading `n`.
    url.split('/')
        .filter_map(|part| part.strip_prefix('n'))
        .filter(|rest| !rest.is_empty())
        .find_map(|rest| {
            let (nf, _) = rest.split_once('-')?;
            (!nf.is_empty()).then(|| nf.to_uppercase())
        })
}

fn nf_from_tags(tags: &[Tag]) -> Option<String> {
    let name = tags.first()?.name.trim();
    (!name.is_empty()).then(|| name.to_uppercase())
}

/// Maps a candidate to a known NF name, or `None` if it does not name one.
pub fn normalize_nf_name(candidate: &str) -> Option<&'static str> {
    let mut name = candidate.trim().to_uppercase();
    if name.is_empty() {
        return None;
    }
    if let Some((_, nf)) = LONG_NAMES.iter().find(|(long, _)| name.contains(long)) {
        return Some(*nf);
    }

    for suffix in NAME_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_owned();
        }
    }
    let name = name.trim();

    // Exact matches first, so that `NSSAAF` is not taken for `AF`.
    KNOWN_NFS
        .iter()
        .find(|nf| name == **nf)
        .or_else(|| KNOWN_NFS.iter().find(|nf| name.contains(*nf)))
        .copied()
}

/// Derives the service name of a document.
///
/// The first OAuth2 client-credentials scope is preferred, the title is used otherwise. A trailing
/// `Service` is removed in both cases.
pub fn service_name(document: &OpenApiDocument) -> String {
    let from_scope = document
        .security
        .iter()
        .filter_map(|requirement| requirement.get("oAuth2ClientCredentials"))
        .filter_map(|scopes| scopes.first())
        .map(|scope| scope.trim().to_uppercase())
        .find(|scope| !scope.is_empty());

    let name = match from_scope {
        Some(scope) => scope,
        None => {
            let title = document.info.title.trim().replace('\'', "");
            if title.is_empty() {
                "Unknown".to_owned()
            } else {
                title
            }
        }
    };

    match name.strip_suffix("Service") {
        Some(stripped) if !stripped.is_empty() => stripped.trim_end().to_owned(),
        _ => name,
    }
}

/// Returns the first sentence of the document description.
///
/// Empty lines and copyright notices are dropped.
pub fn service_description(document: &OpenApiDocument) -> String {
    let cleaned = document
        .info
        .description
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.contains('©') && !line.contains("All rights reserved")
        })
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return "API Service".to_owned();
    }

    let mut chars = cleaned.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        let ends_sentence = matches!(c, '.' | '!' | '?');
        if ends_sentence && chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
            return cleaned[..idx].trim().to_owned();
        }
    }
    cleaned.trim_end_matches(['.', '!', '?']).to_owned()
}

/// Returns the base path of the service from the first server URL.
///
/// `{apiRoot}/nausf-auth/v1` and `https://host/nausf-auth/v1` both yield `/nausf-auth/v1`. Without
/// a usable server URL the base path is empty and operation paths are used as they are.
pub fn service_base_path(document: &OpenApiDocument) -> String {
    let Some(server) = document.servers.first() else {
        return String::new();
    };
    let url = server.url.trim();

    let path = if let Some((_, rest)) = url.split_once('}') {
        rest
    } else if let Some((_, host_and_path)) = url.split_once("://") {
        host_and_path
            .find('/')
            .map_or("", |idx| &host_and_path[idx..])
    } else {
        url
    };

    let path = path.trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

/// Extracts the API version, such as `v1`, from a base path. Defaults to `v1`.
pub fn version_from_path(path: &str) -> String {
    path.split('/')
        .find(|segment| {
            segment.len() >= 2
                && segment.len() <= 3
                && segment.starts_with('v')
                && segment[1..].chars().all(|c| c.is_ascii_digit())
        })
        .unwrap_or("v1")
        .to_owned()
}

/// Generates an API name from its method and path.
///
/// Placeholders are skipped and the remaining segments are title-cased, for example
/// `GET /ue-contexts/{id}` becomes `GetUeContexts` and `GET /ue-contexts` becomes
/// `ListUeContexts`.
pub fn generated_api_name(method: Method, path: &str) -> String {
    let words: String = path
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .flat_map(|segment| segment.split(['-', '_']))
        .map(capitalize)
        .collect();

    let method_word = capitalize(&method.as_str().to_lowercase());
    if words.is_empty() {
        return method_word;
    }

    let prefix = match method {
        Method::Get if path.contains('{') => "Get",
        Method::Get => "List",
        Method::Post => "Create",
        Method::Put | Method::Patch => "Update",
        Method::Delete => "Delete",
        Method::Head | Method::Options => method_word.as_str(),
    };
    format!("{prefix}{words}")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::document::Info;

    use super::*;

    fn document(title: &str, description: &str) -> OpenApiDocument {
        OpenApiDocument {
            info: Info {
                title: title.into(),
                description: description.into(),
                version: "1.0.0".into(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn nf_from_title_pattern() {
        let doc = document("AUSF API", "");
        assert_eq!(infer_nf_name(&doc), "AUSF");
    }

    #[test]
    fn nf_from_unified_data_description() {
        let doc = document("Data Repository Access", "Unified Data Repository Service.");
        assert_eq!(infer_nf_name(&doc), "UDR");
    }

    #[test]
    fn nf_from_server_url() {
        let mut doc = document("Ueauthentication", "");
        doc.servers = vec![Server {
            url: "{apiRoot}/nnssf-nsselection/v2".into(),
        }];
        assert_eq!(infer_nf_name(&doc), "NSSF");
    }

    #[test]
    fn unknown_sentinel_when_nothing_matches() {
        let doc = document("Something else entirely", "Lorem ipsum");
        assert_eq!(infer_nf_name(&doc), UNKNOWN_NF);
    }

    #[test]
    fn normalizes_long_names_and_suffixes() {
        assert_eq!(normalize_nf_name("Policy Control Function"), Some("PCF"));
        assert_eq!(normalize_nf_name("nwdaf api"), Some("NWDAF"));
        assert_eq!(normalize_nf_name("hello"), None);
        assert_eq!(normalize_nf_name(""), None);
    }

    #[test]
    fn service_name_prefers_oauth_scope() {
        let mut doc = document("AUSF API", "");
        assert_eq!(service_name(&doc), "AUSF API");

        doc.security = vec![
            Default::default(),
            [("oAuth2ClientCredentials".to_owned(), vec!["nausf-auth".to_owned()])].into(),
        ];
        assert_eq!(service_name(&doc), "NAUSF-AUTH");

        let doc = document("Nudm_SDM Service", "");
        assert_eq!(service_name(&doc), "Nudm_SDM");
    }

    #[test]
    fn description_first_sentence() {
        let doc = document(
            "",
            "AUSF UE Authentication Service.\n© 2023, 3GPP Organizational Partners.\nAll rights reserved.\n",
        );
        assert_eq!(service_description(&doc), "AUSF UE Authentication Service");
        assert_eq!(service_description(&document("", "")), "API Service");
    }

    #[test]
    fn base_paths() {
        let mut doc = document("", "");
        assert_eq!(service_base_path(&doc), "");

        doc.servers = vec![Server {
            url: "{apiRoot}/nausf-auth/v1".into(),
        }];
        assert_eq!(service_base_path(&doc), "/nausf-auth/v1");

        doc.servers = vec![Server {
            url: "https://ausf.example:8443/nausf-auth/v1/".into(),
        }];
        assert_eq!(service_base_path(&doc), "/nausf-auth/v1");

        doc.servers = vec![Server {
            url: "https://ausf.example".into(),
        }];
        assert_eq!(service_base_path(&doc), "");
    }

    #[test]
    fn versions() {
        assert_eq!(version_from_path("/nudm-sdm/v2"), "v2");
        assert_eq!(version_from_path("/nausf-auth"), "v1");
        assert_eq!(version_from_path("/very/long"), "v1");
    }

    #[test]
    fn generated_names() {
        assert_eq!(
            generated_api_name(Method::Post, "/ue-authentications"),
            "CreateUeAuthentications"
        );
        assert_eq!(
            generated_api_name(Method::Get, "/ue-contexts/{ueContextId}"),
            "GetUeContexts"
        );
        assert_eq!(generated_api_name(Method::Get, "/ue-contexts"), "ListUeContexts");
        assert_eq!(
            generated_api_name(Method::Patch, "/{supi}/sdm_subscriptions"),
            "UpdateSdmSubscriptions"
        );
        assert_eq!(generated_api_name(Method::Delete, "/"), "Delete");
    }
}
