use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use feedsync_core::{Currency, Money};
use regex::Regex;
use rust_decimal::Decimal;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_card,
    r"\b(\d{4,6}[+*Xx]{2,}\d{4})\b");

// `<date> <date> <amount> <CUR>`: the tail shared by both layouts.
re!(re_dates_amount,
    r"(\d{2}\.\d{2}\.\d{2})\s+(\d{2}\.\d{2}\.\d{2})\s+(\d+(?:\.\d{1,2})?)\s+([A-Z]{3})\b");

re!(re_committed_code,
    r"^\s*\S+\s+([^\s\\]+)\\");

/// Fields pulled out of a free-text description. Any of them may be missing
/// when the text does not follow the expected layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptionInfo {
    pub card: Option<String>,
    /// Authorization code. Only the committed layout carries one.
    pub code: Option<String>,
    /// Amount in the currency of the original purchase.
    pub amount: Option<Money>,
    /// Day the purchase was authorized.
    pub hold_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionParser;

impl DescriptionParser {
    pub fn new() -> Self {
        DescriptionParser
    }

    /// Hold layout:
    /// `23263612 RU PAYULLC vscale.io>g. Sa 18.02.28 18.02.28 1.00 RUR 111111++++++2222`
    ///
    /// The leading token is the merchant terminal, not an authorization code.
    pub fn extract_hold(&self, text: &str) -> DescriptionInfo {
        let tail = re_dates_amount().captures(text);
        DescriptionInfo {
            card: extract_card(text),
            code: None,
            amount: tail.as_ref().and_then(|c| parse_money(c.get(3)?.as_str(), c.get(4)?.as_str())),
            hold_date: tail
                .as_ref()
                .and_then(|c| NaiveDate::parse_from_str(c.get(1)?.as_str(), "%y.%m.%d").ok()),
        }
    }

    /// Committed layout:
    /// `111111++++++2222  J134850\RUS\MOSCOW\...\SHOP  27.02.18 24.02.18  1480.00  RUR MCC5814`
    ///
    /// The first date is the posting day, the second the authorization day.
    pub fn extract_committed(&self, text: &str) -> DescriptionInfo {
        let tail = re_dates_amount().captures(text);
        DescriptionInfo {
            card: extract_card(text),
            code: capture(re_committed_code(), text),
            amount: tail.as_ref().and_then(|c| parse_money(c.get(3)?.as_str(), c.get(4)?.as_str())),
            hold_date: tail
                .as_ref()
                .and_then(|c| NaiveDate::parse_from_str(c.get(2)?.as_str(), "%d.%m.%y").ok()),
        }
    }
}

fn extract_card(text: &str) -> Option<String> {
    capture(re_card(), text)
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn parse_money(amount: &str, code: &str) -> Option<Money> {
    let amount = Decimal::from_str(amount).ok()?;
    let currency = Currency::from_code(code).ok()?;
    Some(Money::new(amount, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn hold_layout() {
        let info = DescriptionParser::new()
            .extract_hold("23263612 RU PAYULLC vscale.io>g. Sa 18.02.28 18.02.28 1.00 RUR 111111++++++2222");
        assert_eq!(info.card.as_deref(), Some("111111++++++2222"));
        assert!(info.code.is_none());
        assert_eq!(info.amount.unwrap().to_string(), "RUB 1.00");
        assert_eq!(info.hold_date, Some(date(2018, 2, 28)));
    }

    #[test]
    fn committed_layout() {
        let info = DescriptionParser::new().extract_committed(
            "111111++++++2222     J134850\\RUS\\MOSCOW\\CVETNO\\RESTAURANT CE          27.02.18 24.02.18      1480.00  RUR MCC5814",
        );
        assert_eq!(info.card.as_deref(), Some("111111++++++2222"));
        assert_eq!(info.code.as_deref(), Some("J134850"));
        assert_eq!(info.amount.unwrap().to_string(), "RUB 1480.00");
        assert_eq!(info.hold_date, Some(date(2018, 2, 24)));
    }

    #[test]
    fn committed_layout_numeric_code() {
        let info = DescriptionParser::new().extract_committed(
            "111111++++++2222    26895202\\RUS\\MOSKVA\\26  LE\\Yandex Eda             27.02.18 24.02.18       489.00  RUR MCC5814",
        );
        assert_eq!(info.code.as_deref(), Some("26895202"));
        assert_eq!(info.amount.unwrap().to_string(), "RUB 489.00");
    }

    #[test]
    fn foreign_currency_amount() {
        let info = DescriptionParser::new().extract_committed(
            "522222++++++3333    A1B2C3\\USA\\SAN FRANCISCO\\DIGITALOCEAN.COM  05.03.18 03.03.18  10.00  USD MCC4816",
        );
        assert_eq!(info.amount.unwrap().to_string(), "USD 10.00");
    }

    #[test]
    fn free_text_yields_nothing() {
        let parser = DescriptionParser::new();
        assert_eq!(parser.extract_hold("Зачисление зарплаты"), DescriptionInfo::default());
        assert_eq!(parser.extract_committed("Перевод между счетами"), DescriptionInfo::default());
    }

    #[test]
    fn partial_text_keeps_found_fields() {
        let info = DescriptionParser::new().extract_hold("PAYMENT 111111++++++2222");
        assert_eq!(info.card.as_deref(), Some("111111++++++2222"));
        assert!(info.code.is_none());
        assert!(info.amount.is_none());
        assert!(info.hold_date.is_none());
    }

    #[test]
    fn masked_with_stars() {
        let info = DescriptionParser::new().extract_hold("SHOP 427600******1234");
        assert_eq!(info.card.as_deref(), Some("427600******1234"));
    }
}
