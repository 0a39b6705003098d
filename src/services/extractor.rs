use scraper::{ElementRef, Html, Selector};

use crate::domain::product::ProductRecord;

// Structural signatures of the best-seller listing markup.
const PRODUCT_CARD: &str = "div.p13n-sc-uncoverable-faceout";
const TITLE_BLOCK: &str = "div._cDEzb_p13n-sc-css-line-clamp-3_g3dy1";
const PRICE_BLOCK: &str = "span.p13n-sc-price";
const RATING_BLOCK: &str = "span.a-icon-alt";

/// Find-by-selector over one product card. Keeps the field extraction logic
/// independent of the backing markup representation.
pub trait FieldLookup {
    /// Text of the first match, whitespace-trimmed, or `None` when the
    /// signature matches nothing inside the card.
    fn lookup(&self, selector: &str) -> Option<String>;
}

struct HtmlCard<'a> {
    element: ElementRef<'a>,
}

impl FieldLookup for HtmlCard<'_> {
    fn lookup(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        self.element
            .select(&selector)
            .next()
            .map(|block| block.text().collect::<String>().trim().to_string())
    }
}

/// Extract one record per product card, in document order.
///
/// A card missing any single block still yields a record; the missing field
/// is simply `None`. A page with no cards at all yields an empty vec.
pub fn parse_products(html: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse(PRODUCT_CARD).unwrap();

    document
        .select(&card_selector)
        .map(|element| extract_record(&HtmlCard { element }))
        .collect()
}

fn extract_record(card: &impl FieldLookup) -> ProductRecord {
    ProductRecord {
        title: card.lookup(TITLE_BLOCK),
        price: card.lookup(PRICE_BLOCK),
        rating: card.lookup(RATING_BLOCK),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn card_html(title: Option<&str>, price: Option<&str>, rating: Option<&str>) -> String {
        let mut blocks = String::new();
        if let Some(t) = title {
            blocks.push_str(&format!(
                r#"<div class="_cDEzb_p13n-sc-css-line-clamp-3_g3dy1"> {t} </div>"#
            ));
        }
        if let Some(p) = price {
            blocks.push_str(&format!(r#"<span class="p13n-sc-price">{p}</span>"#));
        }
        if let Some(r) = rating {
            blocks.push_str(&format!(r#"<span class="a-icon-alt">{r}</span>"#));
        }
        format!(r#"<div class="p13n-sc-uncoverable-faceout">{blocks}</div>"#)
    }

    #[test]
    fn parse_products_on_page_without_cards_is_empty() {
        let products = parse_products("<html><body><p>Nothing for sale here</p></body></html>");
        assert!(products.is_empty());
    }

    #[test]
    fn parse_products_extracts_all_fields_trimmed() {
        let html = card_html(
            Some("Best Vitamin C, 500mg"),
            Some("$19.99"),
            Some("4.5 out of 5 stars"),
        );
        let products = parse_products(&html);

        assert_eq!(
            products,
            vec![ProductRecord {
                title: Some("Best Vitamin C, 500mg".to_string()),
                price: Some("$19.99".to_string()),
                rating: Some("4.5 out of 5 stars".to_string()),
            }]
        );
    }

    #[test]
    fn parse_products_missing_price_keeps_other_fields() {
        let html = card_html(Some("Elderberry Gummies"), None, Some("4.7 out of 5 stars"));
        let products = parse_products(&html);

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title.as_deref(), Some("Elderberry Gummies"));
        assert_eq!(products[0].price, None);
        assert_eq!(products[0].rating.as_deref(), Some("4.7 out of 5 stars"));
    }

    #[test]
    fn parse_products_keeps_document_order_and_titleless_cards() {
        let html = format!(
            "{}{}",
            card_html(
                Some("Best Vitamin C, 500mg"),
                Some("$19.99"),
                Some("4.5 out of 5 stars")
            ),
            card_html(None, Some("$9.99"), None),
        );
        let products = parse_products(&html);

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].title.as_deref(), Some("Best Vitamin C, 500mg"));
        assert_eq!(products[1].title, None);
        assert_eq!(products[1].price.as_deref(), Some("$9.99"));
    }

    struct SyntheticCard(HashMap<&'static str, &'static str>);

    impl FieldLookup for SyntheticCard {
        fn lookup(&self, selector: &str) -> Option<String> {
            self.0.get(selector).map(|text| text.trim().to_string())
        }
    }

    #[test]
    fn extract_record_works_against_a_synthetic_card() {
        let card = SyntheticCard(HashMap::from([
            (TITLE_BLOCK, "Creatine Monohydrate"),
            (RATING_BLOCK, "4.6 out of 5 stars"),
        ]));
        let record = extract_record(&card);

        assert_eq!(record.title.as_deref(), Some("Creatine Monohydrate"));
        assert_eq!(record.price, None);
        assert_eq!(record.rating.as_deref(), Some("4.6 out of 5 stars"));
    }
}
