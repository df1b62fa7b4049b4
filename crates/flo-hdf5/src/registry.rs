//! Dataset descriptions written as the `description` attribute.

use flo_model::CellArrayKind;

/// Human readable description of a dataset, if one is registered.
pub fn description(dataset: &str) -> Option<&'static str> {
    let text = match dataset {
        "CONT" => "Control parameters in CONT.DAT order",
        "TOLER" => "Tolerance parameters in TOLER.DAT order",
        "CONTROL_NAMES" => "Control parameter names",
        "CONTROL_VALUES" => "Control parameter values as entered",
        "GRIDCODE" => "Grid element number",
        "X" => "Cell centroid x coordinate",
        "Y" => "Cell centroid y coordinate",
        "ELEVATION" => "Cell elevation",
        "MANNING" => "Cell Manning n",
        "CELLSIZE" => "Grid cell size",
        "NEIGHBORS" => "Neighbour grid numbers N E S W NE SE SW NW",
        "DOMAIN_CELLS" => "Grid element, domain, domain cell, connectivity",
        "INFLOW_GLOBAL" => "IHOURDAILY and IDEPLT",
        "INFLOW" => "Inflow kind, inflow/outflow switch and grid element",
        "INFLOW_TIME_SERIES" => "Inflow index, time, discharge and second value",
        "RESERVOIRS" => "Grid element, water surface elevation, n, n switch, tailings",
        "OUTFLOW" => "Grid element and channel, floodplain and hydrograph outflow switches",
        "QH_PARAMS" => "Outflow index, maximum depth, coefficient, exponent",
        "QH_TABLE" => "Outflow index, depth, discharge",
        "OUTFLOW_CHAN_TIME_SERIES" => "Outflow index, time, channel stage",
        "OUTFLOW_FP_TIME_SERIES" => "Outflow index, time, floodplain stage",
        "RAIN_GLOBAL" => "Rainfall switches, total, abstraction and moving storm",
        "RAIN_DATA" => "Rainfall distribution time and cumulative fraction",
        "RAIN_ARF" => "Rainfall reduction per grid element",
        "INFIL_METHOD" => "Infiltration method",
        "INFIL_GREEN_AMPT" => "Global Green-Ampt parameters",
        "INFIL_SCS" => "Global SCS curve number and abstraction",
        "INFIL_HORTON" => "Global Horton parameters",
        "INFIL_CHAN_SEG" => "Channel segment infiltration",
        "INFIL_GA_CELLS" => "Green-Ampt parameters per grid element",
        "INFIL_SCS_CELLS" => "SCS curve number per grid element",
        "INFIL_CHAN_CELLS" => "Channel hydraulic conductivity per grid element",
        "INFIL_HORTON_CELLS" => "Horton parameters per grid element",
        "EVAP_GLOBAL" => "Evaporation month, day and clock time",
        "EVAP_MONTHS" => "Month names",
        "EVAP_MONTHLY" => "Monthly evaporation",
        "EVAP_HOURLY" => "Month index and hourly fraction",
        "CHAN_GLOBAL" => "Segment initial depth, Froude, roughness adjustment, sediment",
        "CHAN_ELEMENTS" => "Segment index, grid, right bank, n, length, shape",
        "CHAN_R" => "Rectangular element geometry",
        "CHAN_V" => "Variable area element geometry",
        "CHAN_T" => "Trapezoidal element geometry",
        "CHAN_N" => "Natural element cross section number",
        "CONFLUENCES" => "Segment index, tributary and main element",
        "NOEXCHANGE" => "Segment index and no-exchange element",
        "CHAN_WSE" => "Segment index and initial water surface",
        "XSEC_NAME" => "Cross section names",
        "XSEC_NUM" => "Cross section numbers",
        "XSEC_DATA" => "Cross section index, station, elevation",
        "STR_CONTROL" => "Structure control values",
        "STR_NAME" => "Structure names",
        "RATING_CURVE" => "Structure rating curves",
        "REPL_RATING_CURVE" => "Replacement rating curves",
        "RATING_TABLE" => "Structure rating tables",
        "CULVERT_EQUATIONS" => "Generalized culvert equations",
        "STORM_DRAIN" => "Structure storm drain capacity",
        "BRIDGE_VARIABLES" => "Structure, record, half, position, value",
        "BRIDGE_XSEC" => "Bridge cross section points",
        "STREET_GLOBAL" => "Global street parameters",
        "STREET_NAMES" => "Street names",
        "STREET_SEG" => "Street index and segment values",
        "STREET_ELEMS" => "Segment index, direction, width",
        "ARF_GLOBAL" => "Blocking mode",
        "ARF_TOTALLY_BLOCKED" => "Totally blocked elements, negative when collapsing",
        "ARF_PARTIALLY_BLOCKED" => "Partially blocked elements with width reductions",
        "MULT_GLOBAL" => "Global multiple channel parameters",
        "MULT" => "Multiple channel elements",
        "SIMPLE_MULT_GLOBAL" => "Simplified multiple channel n",
        "SIMPLE_MULT_CELLS" => "Simplified multiple channel elements",
        "MUD" => "Mudflow parameters",
        "SED" => "Sediment transport parameters",
        "SED_GROUPS" => "Sediment groups",
        "SED_GROUP_FRAC" => "Group index, diameter, percent finer",
        "MUD_AREAS" => "Mudflow areas",
        "SED_RIGID_CELLS" => "Rigid bed elements",
        "SED_SUPPLY" => "Sediment supply elements",
        "SED_SUPPLY_FRAC" => "Supply index, diameter, percent finer",
        "SED_GROUP_CELLS" => "Grid element and sediment group",
        "LEVEE_GLOBAL" => "Levee raise and failure switch",
        "LEVEE_CELLS" => "Levee grid elements",
        "LEVEE_DATA" => "Levee index, direction, crest elevation",
        "LEVEE_FAILURE_CELLS" => "Failure grid elements",
        "LEVEE_FAILURE" => "Failure index and wall values",
        "LEVEE_FRAGILITY_GLOBAL" => "Global fragility curve id",
        "LEVEE_FRAGILITY_GLOBAL_PROB" => "Global failure probability",
        "LEVEE_FRAGILITY_CHAR" => "Fragility curve ids per element",
        "LEVEE_FRAGILITY" => "Grid element and failure probability",
        "BREACH_GLOBAL" => "Global breach parameters",
        "BREACH_INDIVIDUAL" => "Grid element and breach parameters",
        "BREACH_FRAGILITY_CHAR" => "Breach fragility curve ids",
        "BREACH_FRAGILITY" => "Failure probability and relative depth",
        "FPXSEC_GLOBAL" => "Cross section output switch",
        "FPXSEC" => "Cross section flow direction and declared cell count",
        "FPXSEC_CELLS" => "Cross section index and grid element",
        "WSURF" => "Grid element and water surface elevation",
        "WSTIME" => "Grid element, water surface elevation, time",
        "GUTTER_GLOBAL" => "Global gutter width, height, n",
        "GUTTER_CELLS" => "Gutter elements",
        "SWMMFLO" => "Storm drain inlet values",
        "SWMMFLO_NAME" => "Storm drain inlet names",
        "SWMMFLO_TAG" => "Storm drain inlet row tags",
        "SD_RATING_NAMES" => "Storm drain rating table names",
        "SD_RATING_BLOCKS" => "Kind, grid element and culvert values",
        "SD_RATING_DATA" => "Block index, depth, discharge",
        "SWMMOUTF_NAME" => "Outfall names",
        "SWMMOUTF" => "Outfall grid element and switch",
        "SPELLING_FILE" => "DAT file of each recorded number spelling",
        "SPELLING_TAG" => "Leading tag of the line the number was read from",
        "SPELLING_TEXT" => "Number as written in the DAT file",
        "SPELLING_KEY" => "Token position and f64 bit pattern of the value",
        other => {
            return CellArrayKind::ALL
                .iter()
                .map(|k| k.spec())
                .find(|s| s.h5_dataset == other)
                .map(|s| s.description);
        }
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_arrays_use_their_catalogue_description() {
        assert_eq!(description("TAILINGS_CV"), Some("Tailings volumetric concentration"));
        assert!(description("GRIDCODE").is_some());
        assert_eq!(description("NOT_A_DATASET"), None);
    }
}
