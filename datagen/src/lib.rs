//! Synthetic historical-ticket datasets for demos and load testing.

use anyhow::Result;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::path::Path;
use triage_core::TicketRow;

pub struct Category {
    pub name: &'static str,
    pub templates: &'static [&'static str],
    pub resolution: &'static str,
}

pub const CATALOG: &[Category] = &[
    Category {
        name: "VPN",
        templates: &[
            "Unable to connect to corporate VPN after password reset on {os}",
            "VPN login failing with error code {error} on {device}",
            "Frequent VPN disconnections while working from {location}",
            "MFA authentication failing during VPN login",
            "VPN access denied after recent security update",
        ],
        resolution: "Clear cached VPN credentials, reauthenticate and verify MFA configuration",
    },
    Category {
        name: "Login",
        templates: &[
            "User account locked after multiple failed login attempts",
            "Forgot Windows system login password on {device}",
            "SSO authentication failing for internal portal",
            "Unable to login to domain after password expiration",
            "Active Directory sync issue preventing login",
        ],
        resolution: "Reset password via admin console and unlock user account in Active Directory",
    },
    Category {
        name: "WiFi",
        templates: &[
            "Laptop not connecting to office WiFi network",
            "Intermittent WiFi disconnection on {os}",
            "Slow internet speed on corporate wireless network",
            "Unable to detect office SSID from {device}",
            "WiFi authentication failed due to security policy",
        ],
        resolution: "Update network drivers, restart router and verify network security policies",
    },
    Category {
        name: "Email",
        templates: &[
            "Outlook application crashing on startup",
            "Unable to send emails via corporate Exchange server",
            "Emails stuck in outbox on {os}",
            "Shared mailbox not accessible in Outlook",
            "Microsoft Teams meeting invites not syncing",
        ],
        resolution: "Reconfigure Outlook profile and resync with Exchange server",
    },
    Category {
        name: "Access Control",
        templates: &[
            "Access denied to shared network drive",
            "Permission error while accessing SharePoint site",
            "User unable to access HR portal",
            "File server access restricted unexpectedly",
            "Unauthorized access error in internal application",
        ],
        resolution: "Grant appropriate permissions and verify role-based access control settings",
    },
];

const OSES: &[&str] = &["Windows 10", "Windows 11", "MacOS Ventura", "Ubuntu 22.04"];
const DEVICES: &[&str] = &["laptop", "desktop", "office workstation"];
const LOCATIONS: &[&str] = &["home network", "office network", "remote location"];
const ERROR_CODES: &[&str] = &["720", "809", "691", "812"];
const PRIORITIES: &[&str] = &["Low", "Medium", "High"];

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &'static [&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

fn fill<R: Rng + ?Sized>(rng: &mut R, template: &str) -> String {
    template
        .replace("{os}", pick(rng, OSES))
        .replace("{device}", pick(rng, DEVICES))
        .replace("{location}", pick(rng, LOCATIONS))
        .replace("{error}", pick(rng, ERROR_CODES))
}

/// `per_category` tickets for every catalog entry, ids counting from 1.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, per_category: usize) -> Vec<TicketRow> {
    let mut rows = Vec::with_capacity(per_category * CATALOG.len());
    for category in CATALOG {
        for _ in 0..per_category {
            let template = pick(rng, category.templates);
            let id = rows.len() as i64 + 1;
            rows.push(
                TicketRow::new(fill(rng, template), category.resolution)
                    .with_id(id)
                    .with_category(category.name)
                    .with_priority(pick(rng, PRIORITIES)),
            );
        }
    }
    rows
}

pub fn write_csv(path: &Path, rows: &[TicketRow]) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut w = csv::Writer::from_path(path)?;
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}
