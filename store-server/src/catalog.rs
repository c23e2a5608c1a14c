//! Catalog Service
//!
//! Reference data the checkout core reads but never mutates: products,
//! coupons, delivery slots, plus the rider directory. Riders are the one
//! mutable part: assignment is a check-and-set on availability so two
//! admins cannot hand the same rider two orders.
//!
//! In production this data would come from a catalog backend; the demo
//! seed mirrors the storefront's fixture data.

use parking_lot::RwLock;
use shared::models::{
    Coupon, DeliverySlot, DiscountType, LocalizedName, Product, Rider, RiderStatus,
};
use thiserror::Error;

/// Store identity used on invoices and company notifications
#[derive(Debug, Clone)]
pub struct CompanyInfo {
    pub name: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
    /// Digits-only, message-app API format
    pub whatsapp: &'static str,
    pub address: &'static str,
}

pub const COMPANY_INFO: CompanyInfo = CompanyInfo {
    name: "GreenBasket",
    phone: "+91 8513028892",
    email: "support@greenbasket.example",
    whatsapp: "918513028892",
    address: "123 Green Market, Sector 4, Kolkata, West Bengal 700001",
};

/// Rider claim failures
#[derive(Debug, Error)]
pub enum RiderClaimError {
    #[error("Rider not found: {0}")]
    NotFound(String),

    #[error("Rider {name} is not available ({status:?})")]
    Unavailable { name: String, status: RiderStatus },
}

/// Catalog service - reference data + rider directory
pub struct CatalogService {
    products: Vec<Product>,
    coupons: Vec<Coupon>,
    slots: Vec<DeliverySlot>,
    riders: RwLock<Vec<Rider>>,
}

impl CatalogService {
    pub fn new(
        products: Vec<Product>,
        coupons: Vec<Coupon>,
        slots: Vec<DeliverySlot>,
        riders: Vec<Rider>,
    ) -> Self {
        Self {
            products,
            coupons,
            slots,
            riders: RwLock::new(riders),
        }
    }

    /// Demo catalog mirroring the storefront fixtures
    pub fn seeded() -> Self {
        Self::new(seed_products(), seed_coupons(), seed_slots(), seed_riders())
    }

    // ========== Products ==========

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    // ========== Coupons ==========

    /// Active coupons only; inactive codes are hidden from listings
    pub fn active_coupons(&self) -> Vec<&Coupon> {
        self.coupons.iter().filter(|c| c.is_active).collect()
    }

    /// Case-insensitive lookup, inactive coupons included
    pub fn find_coupon(&self, code: &str) -> Option<&Coupon> {
        self.coupons.iter().find(|c| c.matches(code))
    }

    // ========== Delivery slots ==========

    pub fn slots(&self) -> &[DeliverySlot] {
        &self.slots
    }

    pub fn available_slots(&self) -> Vec<&DeliverySlot> {
        self.slots.iter().filter(|s| s.available).collect()
    }

    pub fn slot(&self, id: &str) -> Option<&DeliverySlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    // ========== Riders ==========

    pub fn riders(&self) -> Vec<Rider> {
        self.riders.read().clone()
    }

    /// Claim a rider for an order: `Available -> Busy` check-and-set.
    /// Fails if the rider is busy or offline.
    pub fn claim_rider(&self, rider_id: &str, order_id: &str) -> Result<Rider, RiderClaimError> {
        let mut riders = self.riders.write();
        let rider = riders
            .iter_mut()
            .find(|r| r.id == rider_id)
            .ok_or_else(|| RiderClaimError::NotFound(rider_id.to_string()))?;

        if rider.status != RiderStatus::Available {
            return Err(RiderClaimError::Unavailable {
                name: rider.name.clone(),
                status: rider.status,
            });
        }

        rider.status = RiderStatus::Busy;
        rider.current_order_id = Some(order_id.to_string());
        Ok(rider.clone())
    }

    /// Release a rider after delivery or cancellation. Unknown ids are a
    /// no-op; release must never fail an order transition.
    pub fn release_rider(&self, rider_id: &str) {
        let mut riders = self.riders.write();
        if let Some(rider) = riders.iter_mut().find(|r| r.id == rider_id) {
            rider.status = RiderStatus::Available;
            rider.current_order_id = None;
        }
    }
}

// ========== Seed data ==========

fn seed_coupons() -> Vec<Coupon> {
    vec![
        Coupon {
            id: "c1".into(),
            code: "FRESH50".into(),
            discount: DiscountType::Flat(50),
            min_order: 300,
            description: "Flat ₹50 off on orders above ₹300".into(),
            is_active: true,
        },
        Coupon {
            id: "c2".into(),
            code: "WELCOME10".into(),
            discount: DiscountType::Percent(10),
            min_order: 0,
            description: "10% off for new users".into(),
            is_active: true,
        },
        Coupon {
            id: "c3".into(),
            code: "VEGGIE20".into(),
            discount: DiscountType::Percent(20),
            min_order: 500,
            description: "20% off on orders above ₹500".into(),
            is_active: true,
        },
        Coupon {
            id: "c4".into(),
            code: "SUMMER30".into(),
            discount: DiscountType::Flat(30),
            min_order: 200,
            description: "Cool off with ₹30 discount".into(),
            is_active: false,
        },
    ]
}

fn seed_slots() -> Vec<DeliverySlot> {
    vec![
        DeliverySlot {
            id: "s1".into(),
            label: "Early Morning".into(),
            window: "6:00 AM - 9:00 AM".into(),
            surcharge: 0,
            available: true,
        },
        DeliverySlot {
            id: "s2".into(),
            label: "Mid Morning".into(),
            window: "9:00 AM - 12:00 PM".into(),
            surcharge: 0,
            available: true,
        },
        DeliverySlot {
            id: "s3".into(),
            label: "Afternoon".into(),
            window: "12:00 PM - 3:00 PM".into(),
            surcharge: 0,
            available: true,
        },
        DeliverySlot {
            id: "s4".into(),
            label: "Evening".into(),
            window: "3:00 PM - 6:00 PM".into(),
            surcharge: 0,
            available: true,
        },
        DeliverySlot {
            id: "s5".into(),
            label: "Instant Delivery".into(),
            window: "Within 45 mins".into(),
            surcharge: 49,
            available: true,
        },
    ]
}

fn seed_riders() -> Vec<Rider> {
    vec![
        Rider {
            id: "r1".into(),
            name: "Ramesh Kumar".into(),
            phone: "9876543210".into(),
            status: RiderStatus::Available,
            current_order_id: None,
            rating: 4.8,
            vehicle: "Honda Activa".into(),
        },
        Rider {
            id: "r2".into(),
            name: "Suresh Singh".into(),
            phone: "9876543211".into(),
            status: RiderStatus::Busy,
            current_order_id: Some("GB-928374".into()),
            rating: 4.5,
            vehicle: "Bajaj Pulsar".into(),
        },
        Rider {
            id: "r3".into(),
            name: "Abdul Rahman".into(),
            phone: "9876543212".into(),
            status: RiderStatus::Offline,
            current_order_id: None,
            rating: 4.9,
            vehicle: "TVS Jupiter".into(),
        },
        Rider {
            id: "r4".into(),
            name: "Vikram Das".into(),
            phone: "9876543213".into(),
            status: RiderStatus::Available,
            current_order_id: None,
            rating: 4.7,
            vehicle: "Hero Splendor".into(),
        },
    ]
}

fn seed_products() -> Vec<Product> {
    fn product(
        id: &str,
        en: &str,
        hi: &str,
        bn: &str,
        price: i64,
        old_price: Option<i64>,
        category: &str,
        base_unit: &str,
        organic: bool,
    ) -> Product {
        Product {
            id: id.into(),
            name: LocalizedName::new(en, hi, bn),
            price,
            old_price,
            image: format!("/images/{id}.jpg"),
            gallery: (1..=3).map(|n| format!("/images/{id}-{n}.jpg")).collect(),
            category: category.into(),
            description: format!("Farm-fresh {en}, sourced within 12 hours of your order."),
            in_stock: true,
            rating: 4.6,
            reviews: 120,
            base_unit: base_unit.into(),
            is_new: false,
            is_organic: organic,
            is_local: true,
        }
    }

    vec![
        product("p1", "Spinach", "पालक", "পালং শাক", 30, None, "leafy", "bunch", true),
        product("p2", "Tomato", "टमाटर", "টমেটো", 40, Some(48), "vegetables", "kg", false),
        product("p3", "Potato", "आलू", "আলু", 35, None, "vegetables", "kg", false),
        product("p4", "Alphonso Mango", "आम", "আম", 450, Some(520), "fruits", "kg", true),
        product("p5", "Banana", "केला", "কলা", 60, None, "fruits", "dozen", false),
        product("p6", "Paneer", "पनीर", "পনির", 90, None, "dairy", "pc", false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coupon_lookup_is_case_insensitive() {
        let catalog = CatalogService::seeded();
        assert!(catalog.find_coupon("fresh50").is_some());
        assert!(catalog.find_coupon("FRESH50").is_some());
        assert!(catalog.find_coupon("NOPE").is_none());
    }

    #[test]
    fn inactive_coupons_hidden_from_listing_but_findable() {
        let catalog = CatalogService::seeded();
        assert!(catalog.active_coupons().iter().all(|c| c.code != "SUMMER30"));
        assert!(catalog.find_coupon("SUMMER30").is_some());
    }

    #[test]
    fn rider_claim_is_check_and_set() {
        let catalog = CatalogService::seeded();

        let rider = catalog.claim_rider("r1", "GB-1").unwrap();
        assert_eq!(rider.status, RiderStatus::Busy);

        // second claim fails while busy
        let err = catalog.claim_rider("r1", "GB-2").unwrap_err();
        assert!(matches!(err, RiderClaimError::Unavailable { .. }));

        // offline rider cannot be claimed
        assert!(matches!(
            catalog.claim_rider("r3", "GB-3"),
            Err(RiderClaimError::Unavailable { .. })
        ));

        catalog.release_rider("r1");
        assert!(catalog.claim_rider("r1", "GB-4").is_ok());
    }
}
