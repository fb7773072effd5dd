// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall rules: thickness, free height, thermal envelope, fire rating and
//! space linkage

use super::{Minimum, RuleContext};
use crate::classify::SpaceCategory;
use crate::element::{ElementGroup, ElementRecord};
use crate::verdict::{fmt_mm, fmt_num, CheckStatus, Verdict};
use crate::Result;

const GROUP: ElementGroup = ElementGroup::Walls;

fn u_text(u: f64) -> String {
    format!("U={:.3} W/(m2.K)", u)
}

fn flag_text(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "true",
        Some(false) => "false",
        None => "unknown",
    }
}

fn envelope_log(wall: &ElementRecord) -> String {
    format!(
        "is_external={} is_external_source={} u_source={}",
        flag_text(wall.flag("is_external")),
        wall.provenance("is_external"),
        wall.provenance("u_value")
    )
}

pub fn wall_thickness(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let minimum = Minimum {
        group: GROUP,
        attribute: "thickness",
        label: "Thickness",
        subject: "Wall",
        regulation: "DB SE-F",
        minimum: ctx.thresholds.wall_thickness_mm,
        unit: "mm",
    };
    let scale = ctx.population.length_scale_mm;
    Ok(minimum
        .check(ctx, ctx.elements(GROUP))
        .into_iter()
        .zip(ctx.elements(GROUP))
        .map(|(verdict, wall)| {
            verdict
                .long_name(format!(
                    "{} ({}) - DB SE-F Wall Thickness",
                    wall.label(),
                    wall.storey_name()
                ))
                .log(format!(
                    "scale_to_mm={} thickness_source={}",
                    scale,
                    wall.provenance("thickness")
                ))
        })
        .collect())
}

/// Height threshold and the reason it applies
#[derive(Clone, Copy)]
enum HeightLimit {
    Fixed(f64, &'static str),
    /// No spatial information: pass above general, undecidable between
    /// service and general, fail below service
    Bracket { general: f64, service: f64 },
}

fn height_limit(ctx: &RuleContext<'_>, wall: &ElementRecord) -> HeightLimit {
    let t = ctx.thresholds;
    if !t.space_aware_height {
        return HeightLimit::Fixed(t.wall_height_mm, "general limit");
    }
    match (wall.context.category, wall.context.has_links) {
        (SpaceCategory::General, _) => {
            HeightLimit::Fixed(t.wall_height_mm, "general-space context")
        }
        (SpaceCategory::Service, _) => HeightLimit::Fixed(
            t.wall_service_height_mm,
            "service-space context (kitchen/bath/corridor)",
        ),
        (SpaceCategory::Unknown, true) => {
            HeightLimit::Fixed(t.wall_height_mm, "space linked but room type unclear")
        }
        (SpaceCategory::Unknown, false) => HeightLimit::Bracket {
            general: t.wall_height_mm,
            service: t.wall_service_height_mm,
        },
    }
}

pub fn wall_height(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .map(|wall| {
            let limit = height_limit(ctx, wall);
            let required = match limit {
                HeightLimit::Fixed(min, _) => format!(">= {}", fmt_mm(min)),
                HeightLimit::Bracket { general, .. } => format!(">= {}", fmt_mm(general)),
            };
            let verdict = match wall.length("height") {
                None => ctx.missing(GROUP, wall, "height", "Height"),
                Some(h) => {
                    let (status, comment) = match limit {
                        HeightLimit::Fixed(min, reason) if h < min => (
                            CheckStatus::Fail,
                            format!("height={} < {} ({})", fmt_mm(h), fmt_mm(min), reason),
                        ),
                        HeightLimit::Fixed(min, reason) => (
                            CheckStatus::Pass,
                            format!("height={} >= {} ({})", fmt_mm(h), fmt_mm(min), reason),
                        ),
                        HeightLimit::Bracket { general, .. } if h >= general => (
                            CheckStatus::Pass,
                            format!(
                                "height={} >= {} (no IfcSpace link; used general limit)",
                                fmt_mm(h),
                                fmt_mm(general)
                            ),
                        ),
                        HeightLimit::Bracket { general, service } if h >= service => (
                            CheckStatus::Blocked,
                            format!(
                                "height={} between {} and {} (no IfcSpace link to infer room type)",
                                fmt_mm(h),
                                fmt_mm(service),
                                fmt_mm(general)
                            ),
                        ),
                        HeightLimit::Bracket { service, .. } => (
                            CheckStatus::Fail,
                            format!(
                                "height={} < {} (below minimum even for service spaces)",
                                fmt_mm(h),
                                fmt_mm(service)
                            ),
                        ),
                    };
                    Verdict::for_element(wall, status)
                        .actual(fmt_mm(h))
                        .comment(comment)
                }
            };
            verdict
                .required(required)
                .long_name(format!(
                    "{} ({}) - Decree 141/2012 Wall Height",
                    wall.label(),
                    wall.storey_name()
                ))
                .log(format!(
                    "height_source={} space_links={} space_category={:?}",
                    wall.provenance("height"),
                    wall.spaces.boundary_count,
                    wall.context.category
                ))
        })
        .collect();
    Ok(verdicts)
}

pub fn wall_u_value(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let (max_u, zone) = ctx.thresholds.wall_u_limit()?;
    let limit = match zone {
        Some(zone) => format!("{} (zone {})", fmt_num(max_u), zone),
        None => fmt_num(max_u),
    };

    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .map(|wall| {
            let u_value = wall.number("u_value");
            let (status, comment) = match (wall.flag("is_external"), u_value) {
                (Some(false), _) => (
                    CheckStatus::Pass,
                    "Not an external wall; CTE DB HE U-value limit not applicable".to_string(),
                ),
                (None, None) => (
                    CheckStatus::Blocked,
                    "Cannot determine IsExternal and no U-value found in wall property sets"
                        .to_string(),
                ),
                (None, Some(_)) => (
                    CheckStatus::Warning,
                    "U-value found but IsExternal is unknown; verify whether CTE DB HE applies"
                        .to_string(),
                ),
                (Some(true), None) => (
                    CheckStatus::Fail,
                    "External wall has no U-value; CTE DB HE requirement is not met".to_string(),
                ),
                (Some(true), Some(u)) if u > max_u => (
                    CheckStatus::Fail,
                    format!("{} exceeds maximum {}", u_text(u), limit),
                ),
                (Some(true), Some(u)) => (
                    CheckStatus::Pass,
                    format!("CTE DB HE satisfied: U={:.3} <= {} W/(m2.K)", u, limit),
                ),
            };
            Verdict::for_element(wall, status)
                .actual_opt(u_value.map(u_text))
                .required(format!("<= {} W/(m2.K) for external walls", fmt_num(max_u)))
                .comment(comment)
                .long_name(format!("{} ({}) - CTE DB HE U-value", wall.label(), wall.storey_name()))
                .log(envelope_log(wall))
        })
        .collect();
    Ok(verdicts)
}

pub fn wall_external_u_value(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .map(|wall| {
            let u_value = wall.number("u_value");
            let (status, comment) = match (wall.flag("is_external"), u_value) {
                (Some(true), None) => (
                    CheckStatus::Fail,
                    "External wall has no U-value (ThermalTransmittance/UValue)",
                ),
                (Some(true), Some(_)) => (CheckStatus::Pass, "External wall has a U-value"),
                (Some(false), _) => (CheckStatus::Pass, "Not an external wall; U-value not required"),
                (None, _) => (
                    CheckStatus::Blocked,
                    "IsExternal flag not found; cannot determine whether U-value is required",
                ),
            };
            Verdict::for_element(wall, status)
                .actual_opt(u_value.map(u_text))
                .required("U-value required for external walls")
                .comment(comment)
                .long_name(format!("{} ({}) - External U-value", wall.label(), wall.storey_name()))
                .log(envelope_log(wall))
        })
        .collect();
    Ok(verdicts)
}

pub fn wall_fire_rating(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .map(|wall| {
            let rating = wall
                .text("fire_rating")
                .filter(|r| !r.eq_ignore_ascii_case("unknown"));
            let (status, comment) = match (wall.flag("load_bearing"), rating) {
                (Some(false), _) => (
                    CheckStatus::Pass,
                    "Fire rating check not applicable (LoadBearing=False)".to_string(),
                ),
                (None, _) => (
                    CheckStatus::Blocked,
                    format!(
                        "LoadBearing flag not found. Searched: {}",
                        ctx.population.catalog.searched(GROUP, "load_bearing")
                    ),
                ),
                (Some(true), None) => (
                    CheckStatus::Fail,
                    "LoadBearing=True but FireRating missing".to_string(),
                ),
                (Some(true), Some(rating)) => (
                    CheckStatus::Pass,
                    format!("LoadBearing=True with FireRating={}", rating),
                ),
            };
            Verdict::for_element(wall, status)
                .actual_opt(rating.map(str::to_string))
                .required("FireRating required for load-bearing walls")
                .comment(comment)
                .long_name(format!("{} ({}) - Fire Rating", wall.label(), wall.storey_name()))
                .log(format!(
                    "load_bearing={} load_bearing_source={} fire_rating_source={}",
                    flag_text(wall.flag("load_bearing")),
                    wall.provenance("load_bearing"),
                    wall.provenance("fire_rating")
                ))
        })
        .collect();
    Ok(verdicts)
}

pub fn wall_space_boundary(ctx: &RuleContext<'_>) -> Result<Vec<Verdict>> {
    let verdicts = ctx
        .elements(GROUP)
        .iter()
        .map(|wall| {
            let count = wall.spaces.boundary_count;
            let verdict = if wall.spaces.has_links() {
                Verdict::for_element(wall, CheckStatus::Pass).comment(format!(
                    "linked to spaces (IfcRelSpaceBoundary count={})",
                    count
                ))
            } else {
                Verdict::for_element(wall, CheckStatus::Fail).comment("no IfcRelSpaceBoundary link")
            };
            verdict
                .actual(format!("{} space boundaries", count))
                .required(">= 1 space boundary")
                .long_name(format!("{} ({}) - Space Boundary", wall.label(), wall.storey_name()))
                .log(format!("spaces={}", wall.spaces.space_names.join("|")))
        })
        .collect();
    Ok(verdicts)
}
