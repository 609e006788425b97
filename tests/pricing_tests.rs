use rxpad_server::jurisdiction::SecurityTier;
use rxpad_server::pricing::{
    OrderOptions, PaperType, PriceTable, ProductionTime, Quantity, QUANTITIES,
};

#[cfg(test)]
mod pricing_tests {
    use super::*;

    fn options(quantity: u32, paper_type: PaperType, production_time: ProductionTime) -> OrderOptions {
        OrderOptions {
            quantity: Quantity::new(quantity).unwrap(),
            paper_type,
            production_time,
        }
    }

    #[test]
    fn test_base_prices() {
        let table = PriceTable::arizona();
        let q = |n| Quantity::new(n).unwrap();

        assert_eq!(table.price(SecurityTier::MaximumSecurity, q(8)), Ok(135));
        assert_eq!(table.price(SecurityTier::MaximumSecurity, q(80)), Ok(775));
        assert_eq!(table.price(SecurityTier::MinimumSecurity, q(16)), Ok(155));
        assert_eq!(table.price(SecurityTier::NoSecurity, q(40)), Ok(195));
    }

    #[test]
    fn test_every_tier_and_quantity_is_priced() {
        let table = PriceTable::arizona();
        for tier in SecurityTier::ALL {
            let mut previous = 0;
            for quantity in QUANTITIES {
                let price = table.price(tier, Quantity::new(quantity).unwrap()).unwrap();
                assert!(price > previous, "{} x {} should cost more", tier, quantity);
                previous = price;
            }
        }
    }

    #[test]
    fn test_modifiers() {
        let table = PriceTable::arizona();
        assert_eq!(table.paper_modifier(PaperType::Single), Ok(0));
        assert_eq!(table.paper_modifier(PaperType::Carbonless2), Ok(25));
        assert_eq!(table.production_modifier(ProductionTime::Standard), Ok(0));
        assert_eq!(table.production_modifier(ProductionTime::Rush), Ok(35));
    }

    #[test]
    fn test_subtotal_is_base_plus_modifiers() {
        let table = PriceTable::arizona();
        let subtotal = table
            .subtotal(
                SecurityTier::MinimumSecurity,
                &options(16, PaperType::Carbonless2, ProductionTime::Rush),
            )
            .unwrap();
        assert_eq!(subtotal, 155 + 25 + 35);
    }

    #[test]
    fn test_quote_adds_shipping_and_tax() {
        let table = PriceTable::arizona();

        // 215 * 8% = 17.2 -> 17
        let quote = table
            .quote(
                SecurityTier::MinimumSecurity,
                &options(16, PaperType::Carbonless2, ProductionTime::Rush),
            )
            .unwrap();
        assert_eq!(quote.subtotal, 215);
        assert_eq!(quote.shipping, 25);
        assert_eq!(quote.tax, 17);
        assert_eq!(quote.total, 215 + 25 + 17);

        // 135 + 25 = 160, 160 * 8% = 12.8 -> 13
        let quote = table
            .quote(SecurityTier::MaximumSecurity, &OrderOptions::default())
            .unwrap();
        assert_eq!(quote.base, 135);
        assert_eq!(quote.subtotal, 160);
        assert_eq!(quote.shipping, 12);
        assert_eq!(quote.tax, 13);
        assert_eq!(quote.total, 185);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        let table = PriceTable::arizona();
        // 295 + 0 + 0 = 295, 295 * 8% = 23.6 -> 24
        let quote = table
            .quote(
                SecurityTier::NoSecurity,
                &options(80, PaperType::Single, ProductionTime::Standard),
            )
            .unwrap();
        assert_eq!(quote.tax, 24);

        // 125 + 0 + 0 = 125, 125 * 8% = 10.0 -> 10
        let quote = table
            .quote(
                SecurityTier::NoSecurity,
                &options(24, PaperType::Single, ProductionTime::Standard),
            )
            .unwrap();
        assert_eq!(quote.tax, 10);
    }

    #[test]
    fn test_price_table_round_trips_through_json() {
        let json = serde_json::to_string(&PriceTable::arizona()).unwrap();
        let table: PriceTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, PriceTable::arizona());
        assert!(table.ensure_complete(&SecurityTier::ALL).is_ok());
    }
}
