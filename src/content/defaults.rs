//! Hard-coded content mirroring the database schema.
//!
//! Served whenever a row is missing or the database is unreachable, so the
//! public site never renders blank sections. Also used to seed empty tables.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::models::{Service, SiteSettings, Testimonial};

pub const COMPANY_NAME: &str = "Beyond House Interior Construction & Consultancy";
pub const LOCATION: &str = "Nairobi, Kenya";
pub const PHONE: &str = "0791 996 448";
pub const EMAIL: &str = "Beyondhouseint@gmail.com";
pub const WHATSAPP: &str = "+254791996448";
pub const SEO_TITLE: &str = "Beyond House | Interior Construction & Consultancy in Nairobi";
pub const SEO_DESCRIPTION: &str = "Ceiling design, custom cabinetry, walls & décor and premium \
flooring by Beyond House Interior Construction & Consultancy, Nairobi.";

/// Pages whose copy is editable.
pub const PAGES: &[&str] = &[
    "home",
    "about",
    "services",
    "portfolio",
    "consultancy",
    "contact",
];

pub fn is_known_page(page: &str) -> bool {
    PAGES.contains(&page)
}

pub struct DefaultService {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub benefits: &'static [&'static str],
}

pub const SERVICES: &[DefaultService] = &[
    DefaultService {
        slug: "ceiling",
        title: "Ceiling Design",
        description: "Transform your rooms with stunning ceiling designs that add depth, \
character, and modern elegance.",
        benefits: &[
            "Custom gypsum ceiling designs",
            "LED strip and cove lighting integration",
            "Geometric and architectural patterns",
            "Coffered and tray ceiling designs",
            "Sound-absorbing acoustic ceilings",
            "Professional installation and finishing",
        ],
    },
    DefaultService {
        slug: "cabinetry",
        title: "Custom Cabinetry",
        description: "From kitchen cabinets to wardrobes, we design and build custom storage \
solutions that maximize space while adding beauty to your home.",
        benefits: &[
            "Custom kitchen cabinets",
            "Built-in wardrobes and closets",
            "Bathroom vanities and storage",
            "Entertainment centers and shelving",
            "Office and study furniture",
            "Premium hardware and finishes",
        ],
    },
    DefaultService {
        slug: "walls",
        title: "Walls & Décor",
        description: "Stunning accent walls and decorative finishes, from wood paneling to \
textured finishes.",
        benefits: &[
            "Wood slat and panel walls",
            "PVC and WPC wall panels",
            "Textured paint finishes",
            "Decorative molding and trim",
            "Accent wall designs",
            "Mirror and glass installations",
        ],
    },
    DefaultService {
        slug: "floors",
        title: "Floors & Tiles",
        description: "Expert installation of premium tiles, wooden floors, and flooring \
solutions that combine durability with aesthetic appeal.",
        benefits: &[
            "Ceramic and porcelain tiles",
            "Marble and granite flooring",
            "Engineered and solid hardwood",
            "Vinyl and laminate options",
            "Bathroom and kitchen tiling",
            "Professional grouting and finishing",
        ],
    },
];

/// Fallback service rows with stable synthetic ids.
pub fn services() -> Vec<Service> {
    SERVICES
        .iter()
        .enumerate()
        .map(|(index, service)| Service {
            id: Uuid::from_u128(index as u128 + 1),
            title: service.title.to_string(),
            slug: service.slug.to_string(),
            description: Some(service.description.to_string()),
            benefits: Json(service.benefits.iter().map(|b| b.to_string()).collect()),
            image_url: None,
            display_order: i32::try_from(index).unwrap_or(i32::MAX),
            is_visible: true,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        })
        .collect()
}

/// `(client_name, client_role, content)` shown until real reviews exist.
pub const TESTIMONIALS: &[(&str, &str, &str)] = &[
    (
        "Sarah Wanjiku",
        "Homeowner, Karen",
        "Beyond House transformed our living room beyond our expectations. The ceiling \
design and custom cabinets are absolutely stunning. Highly recommend their services!",
    ),
    (
        "James Omondi",
        "Property Developer",
        "Professional, reliable, and creative. They've completed multiple projects for us and \
the quality is consistently excellent. Our clients love the finished spaces.",
    ),
    (
        "Grace Muthoni",
        "Homeowner, Kileleshwa",
        "The team was incredibly patient with our design requests. The kitchen remodel \
exceeded our expectations. Beautiful work and great attention to detail.",
    ),
];

/// Fallback testimonial rows, all five stars.
pub fn testimonials() -> Vec<Testimonial> {
    TESTIMONIALS
        .iter()
        .enumerate()
        .map(|(index, (name, role, content))| Testimonial {
            id: Uuid::from_u128(0x7e57_0000 + index as u128 + 1),
            client_name: name.to_string(),
            client_role: Some(role.to_string()),
            content: content.to_string(),
            rating: 5,
            display_order: i32::try_from(index).unwrap_or(i32::MAX),
            is_visible: true,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        })
        .collect()
}

pub fn site_settings() -> SiteSettings {
    SiteSettings {
        id: Uuid::nil(),
        company_name: COMPANY_NAME.to_string(),
        location: LOCATION.to_string(),
        phone: PHONE.to_string(),
        email: EMAIL.to_string(),
        whatsapp: WHATSAPP.to_string(),
        seo_title: Some(SEO_TITLE.to_string()),
        seo_description: Some(SEO_DESCRIPTION.to_string()),
        logo_url: None,
        social_image_url: None,
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        updated_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

/// Default copy for one `(section, content_key)` slot.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultEntry {
    pub section: &'static str,
    pub key: &'static str,
    pub value: Value,
}

fn entry(section: &'static str, key: &'static str, value: Value) -> DefaultEntry {
    DefaultEntry {
        section,
        key,
        value,
    }
}

pub fn page_defaults(page: &str) -> Vec<DefaultEntry> {
    match page {
        "home" => vec![
            entry("hero", "heading", json!("Beyond House Interior Construction")),
            entry(
                "hero",
                "tagline",
                json!("Transforming Your Space Beyond Imagination"),
            ),
            entry("hero", "cta_label", json!("View Services")),
            entry("hero", "cta_link", json!("/services")),
            entry(
                "director",
                "content",
                json!({
                    "name": "Dancan Odhiambo",
                    "role": "Founder & Director",
                    "description1": "With years of experience in interior construction and design, \
Dancan founded Beyond House with a vision to deliver exceptional quality and innovative designs.",
                    "description2": "His hands-on approach and attention to detail ensure every \
project meets the highest standards.",
                }),
            ),
            entry(
                "features",
                "items",
                json!([
                    { "title": "Quality Craftsmanship", "description": "Premium materials and meticulous finishing." },
                    { "title": "Professional Team", "description": "Designers and skilled craftsmen under one roof." },
                    { "title": "Creative Solutions", "description": "Designs tailored to your unique vision." },
                    { "title": "Timely Delivery", "description": "Projects delivered on schedule without compromise." },
                ]),
            ),
            entry("cta", "heading", json!("Ready to Transform Your Space?")),
            entry(
                "cta",
                "text",
                json!("Let's discuss your project and bring your vision to life."),
            ),
        ],
        "about" => vec![
            entry("hero", "heading", json!("About Beyond House")),
            entry(
                "hero",
                "tagline",
                json!("Crafting exceptional interiors across Kenya"),
            ),
            entry(
                "story",
                "text",
                json!("Beyond House is a premier interior construction company based in Nairobi. \
We have completed over 100 successful projects across Kenya."),
            ),
            entry(
                "stats",
                "items",
                json!([
                    { "value": "100+", "label": "Projects Completed" },
                    { "value": "4", "label": "Core Services" },
                ]),
            ),
        ],
        "services" => vec![
            entry("hero", "heading", json!("Our Services")),
            entry(
                "hero",
                "tagline",
                json!("Complete interior construction solutions"),
            ),
        ],
        "portfolio" => vec![
            entry("hero", "heading", json!("Our Portfolio")),
            entry(
                "hero",
                "tagline",
                json!("A selection of spaces we have transformed"),
            ),
        ],
        "consultancy" => vec![
            entry("hero", "heading", json!("Book a Consultation")),
            entry(
                "hero",
                "tagline",
                json!("Talk to our designers about your next project"),
            ),
        ],
        "contact" => vec![
            entry("hero", "heading", json!("Get in Touch")),
            entry(
                "hero",
                "tagline",
                json!("Request a quote or send us a message"),
            ),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_services_are_ordered_and_visible() {
        let services = services();
        assert_eq!(services.len(), SERVICES.len());
        for (index, service) in services.iter().enumerate() {
            assert_eq!(service.display_order as usize, index);
            assert!(service.is_visible);
            assert!(!service.benefits.0.is_empty());
        }
    }

    #[test]
    fn test_default_testimonials_are_five_star_and_distinct() {
        let testimonials = testimonials();
        assert_eq!(testimonials.len(), 3);
        assert_eq!(testimonials[0].client_name, "Sarah Wanjiku");
        assert!(testimonials.iter().all(|t| t.rating == 5 && t.is_visible));
        assert!(testimonials.iter().all(|t| !t.content.contains("  ")));
        assert_ne!(testimonials[0].id, services()[0].id);
    }

    #[test]
    fn test_every_known_page_has_defaults() {
        for page in PAGES {
            assert!(!page_defaults(page).is_empty(), "no defaults for {}", page);
        }
        assert!(page_defaults("unknown").is_empty());
    }

    #[test]
    fn test_site_settings_default_matches_constants() {
        let settings = site_settings();
        assert_eq!(settings.company_name, COMPANY_NAME);
        assert_eq!(settings.whatsapp, WHATSAPP);
    }
}
