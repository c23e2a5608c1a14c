//! Invoice documents
//!
//! The core supplies structured line items and totals; rendering to a
//! concrete format is the renderer's job. The plain-text renderer ships
//! as the demo adapter; a PDF renderer would implement the same trait.

use chrono::{TimeZone, Utc};
use serde::Serialize;
use shared::models::Order;

use crate::catalog::COMPANY_INFO;

/// One invoice row
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceLine {
    pub name: String,
    pub unit: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub line_total: i64,
}

/// Structured invoice built from a completed order
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDocument {
    pub order_id: String,
    /// Order creation date, e.g. "24 Aug 2026"
    pub issued_on: String,
    pub company_name: String,
    pub company_address: String,
    pub company_phone: String,
    pub bill_to_name: String,
    pub bill_to_phone: String,
    pub bill_to_address: String,
    pub payment_method: String,
    pub courier: String,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: i64,
    pub points_redeemed: i64,
    /// Amount actually charged
    pub total: i64,
}

impl InvoiceDocument {
    pub fn from_order(order: &Order) -> Self {
        let issued_on = Utc
            .timestamp_millis_opt(order.created_at)
            .single()
            .map(|dt| dt.format("%d %b %Y").to_string())
            .unwrap_or_default();

        Self {
            order_id: order.id.clone(),
            issued_on,
            company_name: COMPANY_INFO.name.to_string(),
            company_address: COMPANY_INFO.address.to_string(),
            company_phone: COMPANY_INFO.phone.to_string(),
            bill_to_name: order.customer_name.clone(),
            bill_to_phone: order.customer_phone.clone(),
            bill_to_address: order.address.clone(),
            payment_method: order.payment_method.label().to_string(),
            courier: order
                .rider_name
                .clone()
                .unwrap_or_else(|| "Bombax Logistics".to_string()),
            lines: order
                .items
                .iter()
                .map(|i| InvoiceLine {
                    name: i.name.clone(),
                    unit: i.selected_unit.clone(),
                    quantity: i.quantity,
                    unit_price: i.price,
                    line_total: i.line_total(),
                })
                .collect(),
            subtotal: order.subtotal(),
            points_redeemed: order.points_redeemed,
            total: order.total,
        }
    }
}

/// Rendering seam
pub trait InvoiceRenderer: Send + Sync {
    fn render(&self, doc: &InvoiceDocument) -> Vec<u8>;
    fn content_type(&self) -> &'static str;
    fn file_name(&self, doc: &InvoiceDocument) -> String;
}

/// Plain-text invoice renderer (demo adapter)
pub struct TextInvoiceRenderer;

impl InvoiceRenderer for TextInvoiceRenderer {
    fn render(&self, doc: &InvoiceDocument) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(&format!("{} - INVOICE #{}\n", doc.company_name, doc.order_id));
        out.push_str(&format!("{}\nPhone: {}\n\n", doc.company_address, doc.company_phone));
        out.push_str(&format!(
            "Bill To: {} ({})\n{}\n\n",
            doc.bill_to_name, doc.bill_to_phone, doc.bill_to_address
        ));
        out.push_str(&format!(
            "Order Date: {}   Payment: {}   Courier: {}\n\n",
            doc.issued_on, doc.payment_method, doc.courier
        ));
        out.push_str(&format!(
            "{:<30} {:>8} {:>5} {:>8} {:>10}\n",
            "Item", "Unit", "Qty", "Price", "Total"
        ));
        for line in &doc.lines {
            out.push_str(&format!(
                "{:<30} {:>8} {:>5} {:>8} {:>10}\n",
                line.name,
                line.unit,
                line.quantity,
                format!("Rs. {}", line.unit_price),
                format!("Rs. {}", line.line_total)
            ));
        }
        out.push_str(&format!("\n{:>55} Rs. {}\n", "Subtotal:", doc.subtotal));
        if doc.points_redeemed > 0 {
            out.push_str(&format!(
                "{:>55} Rs. -{}\n",
                "Points Redeemed:", doc.points_redeemed
            ));
        }
        out.push_str(&format!("{:>55} Rs. {}\n", "Grand Total:", doc.total));
        out.push_str("\nThank you for shopping with GreenBasket.\n");
        out.into_bytes()
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_name(&self, doc: &InvoiceDocument) -> String {
        format!("GreenBasket_Invoice_{}.txt", doc.order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{LineItem, OrderStatus, PaymentMethod};

    fn sample_order() -> Order {
        Order {
            id: "GB-123456".into(),
            user_id: "u1".into(),
            created_at: 1_756_000_000_000,
            total: 95,
            status: OrderStatus::Delivered,
            items: vec![
                LineItem {
                    product_id: "p1".into(),
                    name: "Spinach".into(),
                    selected_unit: "bunch".into(),
                    price: 30,
                    quantity: 2,
                },
                LineItem {
                    product_id: "p2".into(),
                    name: "Tomato".into(),
                    selected_unit: "1kg".into(),
                    price: 40,
                    quantity: 1,
                },
            ],
            payment_method: PaymentMethod::Online,
            address: "12 Lake Road, Kolkata".into(),
            customer_name: "Asha".into(),
            customer_phone: "9000000000".into(),
            delivery_slot_id: None,
            coupon_code: None,
            rider_id: Some("r1".into()),
            rider_name: Some("Ramesh Kumar".into()),
            points_redeemed: 5,
            points_earned: 4,
        }
    }

    #[test]
    fn document_snapshots_lines_and_totals() {
        let doc = InvoiceDocument::from_order(&sample_order());
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.subtotal, 100);
        assert_eq!(doc.total, 95);
        assert_eq!(doc.courier, "Ramesh Kumar");
    }

    #[test]
    fn text_render_contains_items_and_total() {
        let doc = InvoiceDocument::from_order(&sample_order());
        let text = String::from_utf8(TextInvoiceRenderer.render(&doc)).unwrap();
        assert!(text.contains("INVOICE #GB-123456"));
        assert!(text.contains("Spinach"));
        assert!(text.contains("Grand Total:"));
        assert_eq!(
            TextInvoiceRenderer.file_name(&doc),
            "GreenBasket_Invoice_GB-123456.txt"
        );
    }
}
