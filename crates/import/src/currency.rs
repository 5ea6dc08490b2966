use feedsync_core::{Currency, MoneyError};

/// Symbols the bank prints next to amounts in place of an ISO code.
const SYMBOLS: &[(&str, &str)] = &[
    ("₽", "RUB"),
    ("р.", "RUB"),
    ("руб", "RUB"),
    ("руб.", "RUB"),
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
];

/// Resolves a currency column value: either an ISO code (legacy `RUR`
/// included) or one of the known symbols.
pub fn resolve_currency(text: &str) -> Result<Currency, MoneyError> {
    let text = text.trim();
    let lowered = text.to_lowercase();
    if let Some((_, code)) = SYMBOLS.iter().find(|(symbol, _)| *symbol == lowered) {
        return Currency::from_code(code);
    }
    Currency::from_code(text)
}

/// Strips a known trailing currency symbol from an amount string, returning
/// the remaining number text and the symbol's currency if one was found.
pub fn split_symbol(text: &str) -> (&str, Option<Currency>) {
    let trimmed = text.trim();
    for (symbol, code) in SYMBOLS {
        if let Some(rest) = trimmed.strip_suffix(symbol) {
            return (rest.trim_end(), Currency::from_code(code).ok());
        }
    }
    (trimmed, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_iso_codes() {
        assert_eq!(resolve_currency("RUR").unwrap().code(), "RUB");
        assert_eq!(resolve_currency("usd").unwrap().code(), "USD");
    }

    #[test]
    fn resolves_symbols() {
        assert_eq!(resolve_currency("₽").unwrap().code(), "RUB");
        assert_eq!(resolve_currency("Руб").unwrap().code(), "RUB");
        assert_eq!(resolve_currency(" € ").unwrap().code(), "EUR");
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        assert!(matches!(
            resolve_currency("¤"),
            Err(MoneyError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn split_symbol_from_amount() {
        let (number, currency) = split_symbol("1 480,00 ₽");
        assert_eq!(number, "1 480,00");
        assert_eq!(currency.unwrap().code(), "RUB");

        let (number, currency) = split_symbol("12.50");
        assert_eq!(number, "12.50");
        assert!(currency.is_none());
    }
}
