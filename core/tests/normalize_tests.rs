use triage_core::normalize::{normalize, Normalizer};

#[test]
fn it_lowercases_strips_and_lemmatizes() {
    let out = normalize("VPN login FAILING with error code 809!");
    assert_eq!(out, "vpn login fail error code");
}

#[test]
fn it_filters_stopwords_and_short_tokens() {
    let words: Vec<String> = Normalizer::english().tokens("The PC is on the office network and it is down");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"pc".to_string()));
    assert_eq!(words, vec!["office", "network"]);
}

#[test]
fn it_deletes_non_letters_without_splitting() {
    assert_eq!(normalize("re-install error720"), "reinstall error");
    assert_eq!(normalize("café"), "caf");
}

#[test]
fn it_can_produce_empty_output() {
    assert_eq!(normalize("is a it of to"), "");
    assert_eq!(normalize("42 !!"), "");
    assert_eq!(normalize(""), "");
}

#[test]
fn normalization_is_idempotent() {
    let samples = [
        "Unable to connect to corporate VPN after password reset on Windows 11",
        "Emails stuck in outbox; printers jammed, children forgot passwords",
        "Running updates stopped the drivers from loading, connections denied",
        "Access denied to shared network drive",
        "is a it of to",
        "Whos got the spreadsheets, invoices and gizmoboxes the wolves took",
    ];
    for s in samples {
        let once = normalize(s);
        assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
    }
}

#[test]
fn everyday_plurals_reduce_outside_the_it_vocabulary() {
    assert_eq!(normalize("Spreadsheets and attachments"), "spreadsheet attachment");
    assert_eq!(normalize("Projectors, invoices, wolves"), "projector invoice wolf");
}
