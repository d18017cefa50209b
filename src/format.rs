// ============================================================================
// Module : format (Formatter)
// ============================================================================
// Rendu d'une pièce en texte pour la barre
//
// Format : "<icône> $43123.46 24hV:$+21000000000 1h:-0.12% 24h:+1.50% 7d:+3.00% "
//
// - l'ordre des champs est fixe, quel que soit l'ordre dans la config
// - chaque champ est suivi d'un espace (espace final conservé)
// - volume et variations portent un signe explicite, le prix non
// ============================================================================

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{DisplayField, DisplayFields, Quote, WatchlistEntry};

/// Rend une pièce selon les champs demandés
pub fn render(
    entry: &WatchlistEntry,
    quote: &Quote,
    fields: &DisplayFields,
    currency_symbol: &str,
) -> String {
    let mut output = format!("{} ", entry.icon);

    for field in DisplayField::ALL {
        if !fields.shows(field) {
            continue;
        }

        let rendered = match field {
            DisplayField::Price => {
                let price = round_to(quote.price, entry.price_precision);
                format!("{}{}", currency_symbol, price)
            }
            DisplayField::Volume24h => {
                let volume = round_to(quote.volume_24h, entry.volume_precision);
                format!("24hV:{}{}", currency_symbol, signed(volume))
            }
            DisplayField::Change1h => {
                let change = round_to(quote.pct_change_1h, entry.change_precision);
                format!("1h:{}%", signed(change))
            }
            DisplayField::Change24h => {
                let change = round_to(quote.pct_change_24h, entry.change_precision);
                format!("24h:{}%", signed(change))
            }
            DisplayField::Change7d => {
                let change = round_to(quote.pct_change_7d, entry.change_precision);
                format!("7d:{}%", signed(change))
            }
        };

        output.push_str(&rendered);
        output.push(' ');
    }

    output
}

/// Arrondi décimal à `precision` chiffres, complété par des zéros
///
/// CONCEPT : arrondi bancaire (demi vers le pair)
/// - 2.675 à 2 décimales -> 2.68, 0.125 -> 0.12
/// - rescale() complète : 5 à 2 décimales -> "5.00"
/// - précision 0 : entier, sans point décimal
pub fn round_to(value: Decimal, precision: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(precision, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(precision);

    // Un zéro garde le signe de la valeur d'origine : -0.001 -> "-0.00"
    if rounded.is_zero() {
        rounded.set_sign_negative(value.is_sign_negative());
    }
    rounded
}

/// Signe explicite, y compris pour un zéro négatif
fn signed(value: Decimal) -> String {
    let sign = if value.is_sign_negative() { '-' } else { '+' };
    format!("{}{}", sign, value.abs())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn quote() -> Quote {
        Quote {
            price: dec("43123.456789"),
            volume_24h: dec("21000000000.49"),
            pct_change_1h: dec("-0.1234"),
            pct_change_24h: dec("1.5"),
            pct_change_7d: dec("-0.001"),
        }
    }

    fn entry() -> WatchlistEntry {
        WatchlistEntry::new("BTC", "B", 2, 2, 0)
    }

    #[test]
    fn test_empty_fields_render_price_only() {
        let text = render(&entry(), &quote(), &DisplayFields::default(), "$");
        assert_eq!(text, "B $43123.46 ");
    }

    #[test]
    fn test_all_fields_in_fixed_order() {
        let fields = DisplayFields::new([
            DisplayField::Change7d,
            DisplayField::Change1h,
            DisplayField::Volume24h,
            DisplayField::Change24h,
            DisplayField::Price,
        ]);
        let text = render(&entry(), &quote(), &fields, "$");
        assert_eq!(
            text,
            "B $43123.46 24hV:$+21000000000 1h:-0.12% 24h:+1.50% 7d:-0.00% "
        );
    }

    #[test]
    fn test_changes_without_price() {
        let fields = DisplayFields::new([DisplayField::Change24h]);
        let text = render(&entry(), &quote(), &fields, "€");
        assert_eq!(text, "B 24h:+1.50% ");
    }

    #[test]
    fn test_zero_precision_has_no_decimal_point() {
        assert_eq!(round_to(dec("43123.5"), 0).to_string(), "43124");
        assert_eq!(round_to(dec("42.5"), 0).to_string(), "42");
        assert_eq!(round_to(dec("7"), 0).to_string(), "7");
    }

    #[test]
    fn test_rounding_is_decimal_half_even() {
        assert_eq!(round_to(dec("2.675"), 2).to_string(), "2.68");
        assert_eq!(round_to(dec("0.125"), 2).to_string(), "0.12");
        assert_eq!(round_to(dec("0.135"), 2).to_string(), "0.14");
    }

    #[test]
    fn test_rounding_pads_to_precision() {
        assert_eq!(round_to(dec("5"), 2).to_string(), "5.00");
        assert_eq!(round_to(dec("1.5"), 3).to_string(), "1.500");
    }

    #[test]
    fn test_signed() {
        assert_eq!(signed(dec("1.50")), "+1.50");
        assert_eq!(signed(dec("-0.12")), "-0.12");
        assert_eq!(signed(round_to(dec("-0.001"), 2)), "-0.00");
        assert_eq!(signed(round_to(dec("0.001"), 2)), "+0.00");
        assert_eq!(signed(round_to(dec("-0.4"), 0)), "-0");
    }

    #[test]
    fn test_max_precision_fits_large_volume() {
        let rounded = round_to(dec("21000000000.49"), 16);
        assert_eq!(rounded.scale(), 16);
        assert_eq!(rounded.to_string(), "21000000000.4900000000000000");
    }

    #[test]
    fn test_negative_volume_sign_after_symbol() {
        let mut q = quote();
        q.volume_24h = dec("-12.345");
        let fields = DisplayFields::new([DisplayField::Volume24h]);
        let entry = WatchlistEntry::new("BTC", "B", 2, 2, 1);
        assert_eq!(render(&entry, &q, &fields, "$"), "B 24hV:$-12.3 ");
    }
}
