// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit assignment extraction from IFC files

use ifcore_model::{
    AttributeValue, DeclaredUnit, DecodedEntity, EntityResolver, EntityResolverExt, IfcType, ParseError, Result,
    UnitAssignment,
};

/// Extract the project's declared units
///
/// Follows IFCPROJECT.UnitsInContext (attribute 8) to the IFCUNITASSIGNMENT
/// and decodes every SI and conversion-based unit in it. A file without a
/// project or without UnitsInContext yields an empty assignment. A unit
/// assignment that is present but broken is an error: checks cannot run on
/// lengths of unknown scale.
pub fn extract_unit_assignment(resolver: &dyn EntityResolver) -> Result<UnitAssignment> {
    let Some(project) = resolver.entities_by_type(&IfcType::IfcProject).into_iter().next() else {
        return Ok(UnitAssignment::default());
    };

    if matches!(project.get(8), None | Some(AttributeValue::Null)) {
        return Ok(UnitAssignment::default());
    }

    let assignment = resolver
        .resolve_attr_or_err(&project, 8)
        .map_err(|_| ParseError::unit(format!("UnitsInContext of {} does not resolve", project.id)))?;

    if assignment.ifc_type != IfcType::IfcUnitAssignment {
        return Err(ParseError::unit(format!(
            "UnitsInContext of {} points at {} ({}), not an IFCUNITASSIGNMENT",
            project.id, assignment.id, assignment.ifc_type
        )));
    }

    // Units at 0
    let unit_ids = assignment.get_refs(0).ok_or_else(|| {
        ParseError::unit(format!("{} has no list of units", assignment.id))
    })?;

    let mut units = Vec::with_capacity(unit_ids.len());
    for id in unit_ids {
        let unit = resolver
            .get_or_err(id)
            .map_err(|_| ParseError::unit(format!("unit {} does not resolve", id)))?;
        if let Some(declared) = declared_unit(&unit, resolver)? {
            units.push(declared);
        }
    }

    Ok(UnitAssignment { units })
}

/// Decode one unit entity; derived and monetary units are skipped
fn declared_unit(unit: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<Option<DeclaredUnit>> {
    match unit.ifc_type {
        // IFCSIUNIT(Dimensions, UnitType, Prefix, Name)
        IfcType::IfcSiUnit => {
            let unit_type = required_enum(unit, 1, "UnitType")?;
            let name = required_enum(unit, 3, "Name")?;
            Ok(Some(DeclaredUnit::si(unit_type, unit.get_enum(2), name)))
        }
        // IFCCONVERSIONBASEDUNIT(Dimensions, UnitType, Name, ConversionFactor)
        IfcType::IfcConversionBasedUnit => {
            let unit_type = required_enum(unit, 1, "UnitType")?;
            let name = unit.get_text(2).unwrap_or_default();
            let factor = conversion_factor(unit, resolver)?;
            Ok(Some(DeclaredUnit::converted(unit_type, name, factor)))
        }
        IfcType::IfcDerivedUnit | IfcType::IfcMonetaryUnit => Ok(None),
        _ => Err(ParseError::unit(format!(
            "{} ({}) is not a unit",
            unit.id, unit.ifc_type
        ))),
    }
}

fn required_enum<'a>(unit: &'a DecodedEntity, index: usize, what: &str) -> Result<&'a str> {
    unit.get_enum(index)
        .ok_or_else(|| ParseError::unit(format!("{} has no {}", unit.id, what)))
}

/// SI base units per one converted unit
///
/// IFCMEASUREWITHUNIT(ValueComponent, UnitComponent); the unit component
/// may itself carry a prefix (a foot defined as 304.8 millimetres).
fn conversion_factor(unit: &DecodedEntity, resolver: &dyn EntityResolver) -> Result<f64> {
    let measure = resolver
        .resolve_attr_or_err(unit, 3)
        .map_err(|_| ParseError::unit(format!("{} has no conversion factor", unit.id)))?;

    if measure.ifc_type != IfcType::IfcMeasureWithUnit {
        return Err(ParseError::unit(format!(
            "conversion factor of {} is {}, not an IFCMEASUREWITHUNIT",
            unit.id, measure.ifc_type
        )));
    }

    let value = measure
        .get_float(0)
        .ok_or_else(|| ParseError::unit(format!("{} has no numeric value", measure.id)))?;

    let base_scale = match measure.get_ref(1).and_then(|id| resolver.get(id)) {
        Some(base) if base.ifc_type == IfcType::IfcSiUnit => {
            base.get_enum(2).map(prefix_scale).transpose()?.unwrap_or(1.0)
        }
        _ => 1.0,
    };

    Ok(value * base_scale)
}

/// Scale of an SI prefix
pub fn prefix_scale(prefix: &str) -> Result<f64> {
    let scale = match prefix {
        "EXA" => 1e18,
        "PETA" => 1e15,
        "TERA" => 1e12,
        "GIGA" => 1e9,
        "MEGA" => 1e6,
        "KILO" => 1e3,
        "HECTO" => 1e2,
        "DECA" => 1e1,
        "DECI" => 1e-1,
        "CENTI" => 1e-2,
        "MILLI" => 1e-3,
        "MICRO" => 1e-6,
        "NANO" => 1e-9,
        "PICO" => 1e-12,
        "FEMTO" => 1e-15,
        "ATTO" => 1e-18,
        other => return Err(ParseError::unit(format!("unknown SI prefix {}", other))),
    };
    Ok(scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolverImpl;
    use crate::scanner::EntityScanner;

    fn resolver(data: &str) -> ResolverImpl {
        let content = format!("ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n{}\nENDSEC;\n", data);
        let (index, types) = EntityScanner::build_indices(&content);
        ResolverImpl::new(content, index, types)
    }

    #[test]
    fn test_si_units() {
        let resolver = resolver(
            "#1=IFCPROJECT('g',$,'P',$,$,$,$,$,#2);\n\
             #2=IFCUNITASSIGNMENT((#3,#4,#5));\n\
             #3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\n\
             #4=IFCSIUNIT(*,.AREAUNIT.,$,.SQUARE_METRE.);\n\
             #5=IFCDERIVEDUNIT((),.THERMALTRANSMITTANCEUNIT.,$);",
        );
        let units = extract_unit_assignment(&resolver).unwrap();
        assert_eq!(units.units.len(), 2);

        let length = units.length_unit().unwrap();
        assert_eq!(length.name, "METRE");
        assert_eq!(length.prefix.as_deref(), Some("MILLI"));
        assert_eq!(units.unit("AREAUNIT").unwrap().prefix, None);
    }

    #[test]
    fn test_conversion_based_unit() {
        let resolver = resolver(
            "#1=IFCPROJECT('g',$,'P',$,$,$,$,$,#2);\n\
             #2=IFCUNITASSIGNMENT((#3));\n\
             #3=IFCCONVERSIONBASEDUNIT(#4,.LENGTHUNIT.,'FOOT',#5);\n\
             #4=IFCDIMENSIONALEXPONENTS(1,0,0,0,0,0,0);\n\
             #5=IFCMEASUREWITHUNIT(IFCLENGTHMEASURE(304.8),#6);\n\
             #6=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);",
        );
        let units = extract_unit_assignment(&resolver).unwrap();
        let foot = units.length_unit().unwrap();
        assert_eq!(foot.name, "FOOT");
        assert!((foot.conversion_factor.unwrap() - 0.3048).abs() < 1e-9);
    }

    #[test]
    fn test_missing_assignment_is_empty() {
        let unset = resolver("#1=IFCPROJECT('g',$,'P',$,$,$,$,$,$);");
        assert_eq!(extract_unit_assignment(&unset).unwrap(), UnitAssignment::default());

        let no_project = resolver("#1=IFCWALL('g',$,'W',$,$,$,$,$);");
        assert!(extract_unit_assignment(&no_project).unwrap().units.is_empty());
    }

    #[test]
    fn test_malformed_assignment_is_error() {
        let dangling = resolver("#1=IFCPROJECT('g',$,'P',$,$,$,$,$,#9);");
        assert!(matches!(
            extract_unit_assignment(&dangling),
            Err(ParseError::InvalidUnit(_))
        ));

        let wrong_class = resolver(
            "#1=IFCPROJECT('g',$,'P',$,$,$,$,$,#2);\n#2=IFCWALL('g',$,'W',$,$,$,$,$);",
        );
        assert!(matches!(
            extract_unit_assignment(&wrong_class),
            Err(ParseError::InvalidUnit(_))
        ));

        let no_name = resolver(
            "#1=IFCPROJECT('g',$,'P',$,$,$,$,$,#2);\n\
             #2=IFCUNITASSIGNMENT((#3));\n\
             #3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,$);",
        );
        assert!(matches!(
            extract_unit_assignment(&no_name),
            Err(ParseError::InvalidUnit(_))
        ));
    }

    #[test]
    fn test_prefix_scale() {
        assert_eq!(prefix_scale("MILLI").unwrap(), 1e-3);
        assert_eq!(prefix_scale("KILO").unwrap(), 1e3);
        assert!(prefix_scale("SMIDGEN").is_err());
    }
}
