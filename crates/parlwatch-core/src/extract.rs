//! Narrative field extraction.
//!
//! Some upstream rows only describe an interest in prose, e.g.
//! `"Name of donor: GB News Limited, £5,000 received on 2 June 2024"`. The
//! functions here pull a best-effort payer name and monetary amounts out of
//! such text. A miss is a normal outcome and is reported as an empty string
//! or an empty list, never as an error.
//!
//! Payer rules are tried in a fixed order, narrowest first:
//!
//! 1. labelled fields (`Name of donor:`, `Employer:`, `Sponsor:`, ...)
//! 2. sentence-initial `From X` / `By X`
//! 3. inline `from X,`
//! 4. an organisation name directly before "payment received" / "received on"
//! 5. any `<Capitalised Words> <legal suffix>` in the text

use std::sync::LazyLock;

use regex::Regex;

/// Terminator shared by the labelled patterns: a comma, period or semicolon
/// followed by whitespace or the end of the text, or the end itself.
const STOP: &str = r"(?:[,.;](?:\s|$)|$)";

/// Capitalised words forming an organisation name, ending in a legal suffix.
const ORG: &str = concat!(
  r"\b[A-Z][\w&'’-]*",
  r"(?:\s+(?:[A-Z][\w&'’-]*|of|and|&|for|the|de))*?",
  r"\s+(?:(?i:ltd|limited|llp|plc|cic|gmbh|inc|corp|llc)",
  r"|Group|Holdings|Media|Company|Foundation|University|Trust|Corporation",
  r"|SAS|SA|AG|BV)\b\.?",
);

static LABELLED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  [
    r"name of donors?",
    r"name of (?:the\s*)?donor",
    r"name of compan(?:y|ies)",
    r"name of (?:the\s*)?company",
    r"company making (?:the )?payment",
    r"company providing (?:the )?benefit",
    r"name of employer",
    r"employer",
    r"sponsor",
    r"donor",
  ]
  .iter()
  .map(|label| {
    Regex::new(&format!(r"(?i)\b{label}\s*:\s*([^.;\n]+?){STOP}"))
      .expect("static regex")
  })
  .collect()
});

static SENTENCE_INITIAL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  ["from", "by"]
    .iter()
    .map(|cue| {
      Regex::new(&format!(r"(?i)^\s*{cue}\s+([^,.;\n]+?){STOP}"))
        .expect("static regex")
    })
    .collect()
});

static INLINE_FROM: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(&format!(r"(?i:\bfrom)\s+([A-Z][^,.;\n]*?){STOP}"))
    .expect("static regex")
});

static ORG_BEFORE_RECEIPT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(&format!(
    r"({ORG})[\s,–—-]*(?:£\s*[0-9][0-9,]*(?:\.\d{{2}})?[\s,]*)?(?i:payment\s+received|received\s+on)"
  ))
  .expect("static regex")
});

static ORG_ANYWHERE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(&format!("({ORG})")).expect("static regex"));

static BR_TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("static regex"));
static ANY_TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"</?[^>]+>").expect("static regex"));
static WHITESPACE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static TRAILING_PAREN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*$").expect("static regex"));
static TRAILING_DASH: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\s*[-–—]+\s*$").expect("static regex"));

static POUNDS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"£\s*([0-9][0-9,]*)(?:\.(\d{2}))?").expect("static regex")
});
/// Summary lines may carry a single pence digit, as in `"BBC - £46.5"`.
static SUMMARY_POUNDS: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"£\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)").expect("static regex")
});

// ─── Payer ────────────────────────────────────────────────────────────────────

/// Strip HTML tags and collapse whitespace.
pub fn normalize_text(raw: &str) -> String {
  let t = BR_TAG.replace_all(raw, "\n");
  let t = ANY_TAG.replace_all(&t, " ");
  WHITESPACE.replace_all(&t, " ").trim().to_string()
}

/// Tidy a captured name: no trailing `(...)` aside, no trailing dash.
pub fn clean_name(s: &str) -> String {
  let s = TRAILING_PAREN.replace(s, "");
  let s = TRAILING_DASH.replace(&s, "");
  WHITESPACE.replace_all(&s, " ").trim().to_string()
}

/// Best-effort payer name from narrative text; empty when no rule fires.
pub fn extract_payer(raw: &str) -> String {
  let text = normalize_text(raw);
  if text.is_empty() {
    return String::new();
  }

  let first_capture = |rx: &Regex| {
    rx.captures(&text)
      .and_then(|c| c.get(1))
      .map(|m| clean_name(m.as_str()))
      .filter(|s| !s.is_empty())
  };

  LABELLED
    .iter()
    .chain(SENTENCE_INITIAL.iter())
    .chain([&*INLINE_FROM, &*ORG_BEFORE_RECEIPT, &*ORG_ANYWHERE])
    .find_map(first_capture)
    .unwrap_or_default()
}

// ─── Amounts ──────────────────────────────────────────────────────────────────

/// Every `£` figure in `text`, in order of appearance.
///
/// `£26,817.60` yields `26817.6`; pence are only recognised as exactly two
/// digits after the point. Figures too long to represent are dropped.
pub fn extract_all_amounts(text: &str) -> Vec<f64> {
  POUNDS
    .captures_iter(text)
    .filter_map(|c| {
      let whole: String = c[1].chars().filter(|ch| *ch != ',').collect();
      let whole: f64 = whole.parse().ok()?;
      let pence = c
        .get(2)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0);
      Some(whole + f64::from(pence) / 100.0).filter(|n| n.is_finite())
    })
    .collect()
}

/// The amount a record is represented by: the largest `£` figure present.
///
/// Narratives often quote a reference figure next to the actual payment, and
/// the payment is usually the larger of the two.
pub fn representative_amount(text: &str) -> Option<f64> {
  extract_all_amounts(text).into_iter().reduce(f64::max)
}

/// Parse a money-ish string such as `"£1,250.50"` or `" 300 "`.
///
/// Returns `None` for empty, non-numeric, negative or non-finite input.
pub fn parse_money(s: &str) -> Option<f64> {
  let cleaned: String = s
    .chars()
    .filter(|c| *c != '£' && *c != ',' && !c.is_whitespace())
    .collect();
  if cleaned.is_empty() {
    return None;
  }
  cleaned
    .parse::<f64>()
    .ok()
    .filter(|n| n.is_finite() && *n >= 0.0)
}

// ─── Register summaries ───────────────────────────────────────────────────────

/// Payer half of a `"BBC - £46.32"` style summary line.
///
/// Summaries that start with "Payment received on" carry no payer.
pub fn summary_payer(summary: &str) -> Option<String> {
  let summary = summary.trim();
  if summary.is_empty()
    || summary.to_ascii_lowercase().starts_with("payment received on")
  {
    return None;
  }
  let name = summary.split(" - £").next()?.trim();
  name
    .chars()
    .any(|c| c.is_ascii_alphabetic())
    .then(|| name.to_string())
}

/// First `£` figure of a summary line.
pub fn summary_amount(summary: &str) -> Option<f64> {
  SUMMARY_POUNDS
    .captures_iter(summary)
    .find_map(|c| parse_money(&c[1]))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labelled_donor_wins() {
    assert_eq!(
      extract_payer("Name of donor: Acme Ltd, £5,000 received on 2 June 2024"),
      "Acme Ltd"
    );
    assert_eq!(
      extract_payer(
        "Name of donor: GB News Limited, £5,000 received on 2 June 2024"
      ),
      "GB News Limited"
    );
  }

  #[test]
  fn labels_are_case_insensitive_and_plural() {
    assert_eq!(
      extract_payer("NAME OF DONORS: The Example Trust; value £300"),
      "The Example Trust"
    );
    assert_eq!(
      extract_payer("Payment of £1,000. Employer: Big Bank PLC. Hours: 2"),
      "Big Bank PLC"
    );
    assert_eq!(
      extract_payer("Company making the payment: Widgets Inc (via agent)."),
      "Widgets Inc"
    );
  }

  #[test]
  fn labelled_fields_beat_generic_suffix() {
    // A suffixed organisation appears first, but the label is narrower.
    assert_eq!(
      extract_payer("Via Agency Ltd. Sponsor: Jane Smith, £200"),
      "Jane Smith"
    );
  }

  #[test]
  fn html_is_stripped_before_matching() {
    assert_eq!(
      extract_payer("<p>Name of donor:<br/> <b>Acme   Media</b>, £10</p>"),
      "Acme Media"
    );
  }

  #[test]
  fn sentence_initial_cues() {
    assert_eq!(
      extract_payer("From GB News Limited, 292 Vauxhall Bridge Road"),
      "GB News Limited"
    );
    assert_eq!(extract_payer("By Jane Doe; speech"), "Jane Doe");
  }

  #[test]
  fn inline_from() {
    assert_eq!(
      extract_payer("Speaking fee of £2,500 from Channel Five, for an interview"),
      "Channel Five"
    );
  }

  #[test]
  fn organisation_before_receipt_phrase() {
    assert_eq!(
      extract_payer("Article. Northern Media Group - £450 received on 3 May 2024"),
      "Northern Media Group"
    );
    assert_eq!(
      extract_payer("Hours: 3. Acme Holdings payment received 4 April"),
      "Acme Holdings"
    );
  }

  #[test]
  fn generic_suffix_scan() {
    assert_eq!(
      extract_payer("Shares held in Example Widgets Ltd. Registered 2024"),
      "Example Widgets Ltd."
    );
    assert_eq!(
      extract_payer("Visiting lecture at University of Oxford Foundation"),
      "University of Oxford Foundation"
    );
  }

  #[test]
  fn generic_suffix_scan_knows_foreign_and_uncommon_forms() {
    let cases = [
      ("Consultancy for Berliner Verlag GmbH in 2024", "Berliner Verlag GmbH"),
      ("Advisory role at Groupe Lumiere SAS since May", "Groupe Lumiere SAS"),
      ("Board seat with Banco Ejemplo SA until June", "Banco Ejemplo SA"),
      ("Shares in Zurich Tools AG were sold", "Zurich Tools AG"),
      ("Paid speech at Dutch Logistics BV on 4 May", "Dutch Logistics BV"),
      ("Contract with Acme Corp for consulting", "Acme Corp"),
      ("Lecture for Example Broadcasting Corporation in March", "Example Broadcasting Corporation"),
      ("Volunteer director, Riverside Community CIC", "Riverside Community CIC"),
      ("Consulting for Widgets Inc this year", "Widgets Inc"),
    ];
    for (text, payer) in cases {
      assert_eq!(extract_payer(text), payer, "{text}");
    }
  }

  #[test]
  fn no_rule_fires_yields_empty() {
    assert_eq!(
      extract_payer("Residential property in Kent (registered on election)"),
      ""
    );
    assert_eq!(extract_payer("value approximately £5,000"), "");
    assert_eq!(extract_payer(""), "");
    assert_eq!(extract_payer("   <br>  "), "");
  }

  #[test]
  fn clean_name_trims_asides_and_dashes() {
    assert_eq!(clean_name("Acme Ltd (see note)"), "Acme Ltd");
    assert_eq!(clean_name("Acme   Ltd -"), "Acme Ltd");
  }

  #[test]
  fn all_amounts_in_order() {
    let amounts =
      extract_all_amounts("£500 paid, then £26,817.60 and £1,200; ref £3.5");
    assert_eq!(amounts, vec![500.0, 26817.6, 1200.0, 3.0]);
    assert!(extract_all_amounts("no money here").is_empty());
  }

  #[test]
  fn representative_is_the_maximum() {
    let text = "Reference £1,000. Payment of £2,500.50 received. Expenses £75";
    let all = extract_all_amounts(text);
    let max = all.iter().copied().fold(f64::MIN, f64::max);
    assert_eq!(representative_amount(text), Some(max));
    assert_eq!(representative_amount(text), Some(2500.5));
    assert_eq!(representative_amount("nothing"), None);
  }

  #[test]
  fn money_parsing_is_tolerant() {
    assert_eq!(parse_money("£1,250.50"), Some(1250.5));
    assert_eq!(parse_money(" 300 "), Some(300.0));
    assert_eq!(parse_money("£"), None);
    assert_eq!(parse_money("approx"), None);
    assert_eq!(parse_money("-20"), None);
    assert_eq!(parse_money("inf"), None);
  }

  #[test]
  fn summary_helpers() {
    assert_eq!(summary_payer("BBC - £46.32").as_deref(), Some("BBC"));
    assert_eq!(summary_payer("Payment received on 2 June 2024 - £50"), None);
    assert_eq!(summary_payer("- £10"), None);
    assert_eq!(summary_amount("BBC - £46.32"), Some(46.32));
    assert_eq!(summary_amount("BBC - £46.5"), Some(46.5));
    assert_eq!(summary_amount("Acme - £1,200"), Some(1200.0));
    assert_eq!(summary_amount("Payment received on 2 June 2024"), None);
  }

  #[test]
  fn overlong_figures_are_not_amounts() {
    let huge = format!("Name of donor: Acme Ltd, £{} received", "9".repeat(400));
    assert!(extract_all_amounts(&huge).is_empty());
    assert_eq!(representative_amount(&huge), None);
    assert_eq!(
      representative_amount(&format!("£{} then £20", "9".repeat(400))),
      Some(20.0)
    );
    assert_eq!(summary_amount(&format!("BBC - £{}", "9".repeat(400))), None);
  }
}
