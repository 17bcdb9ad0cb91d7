/// Test fixtures: representative RDB payloads from the USGS Daily Values service.
///
/// These fixtures are structurally complete but truncated to the minimum
/// needed to exercise the parser. They reflect the real RDB text returned by:
///   https://waterservices.usgs.gov/nwis/dv/?format=rdb&...
///
/// RDB shape:
///   `#` comment block (agency notice, site list, column descriptions)
///   header line       - agency_cd, site_no, datetime, <ts>_00060_00003, <ts>_00060_00003_cd
///   format line       - field widths and types, e.g. "5s 15s 20d 14n 10s"
///   data lines        - one per day, tab-delimited
///
/// Discharge cells may hold a no-data code ("Eqp" = equipment malfunction,
/// "Ice" = ice affected) instead of a number.

/// Wildcat Creek (03335000) around the start of water year 1970.
/// Oct 2 is "Eqp", Oct 3 is "Ice", and Oct 5 is absent from the file.
#[cfg(test)]
pub(crate) fn fixture_wildcat_dv_rdb() -> &'static str {
    "# ---------------------------------- WARNING ----------------------------------------\n\
# Some of the data that you have obtained from this U.S. Geological Survey database\n\
# may not have received Director's approval.\n\
#\n\
# Data for the following 1 site(s) are contained in this file\n\
#    USGS 03335000 WILDCAT CREEK NEAR LAFAYETTE, IN\n\
# -----------------------------------------------------------------------------------\n\
#\n\
# TS   parameter     statistic     Description\n\
# 84537       00060     00003     Discharge, cubic feet per second (Mean)\n\
#\n\
agency_cd\tsite_no\tdatetime\t84537_00060_00003\t84537_00060_00003_cd\n\
5s\t15s\t20d\t14n\t10s\n\
USGS\t03335000\t1969-09-28\t47.0\tA\n\
USGS\t03335000\t1969-09-29\t45.0\tA\n\
USGS\t03335000\t1969-09-30\t44.0\tA\n\
USGS\t03335000\t1969-10-01\t43.0\tA\n\
USGS\t03335000\t1969-10-02\tEqp\tA\n\
USGS\t03335000\t1969-10-03\tIce\tA\n\
USGS\t03335000\t1969-10-04\t60.0\tA\n\
USGS\t03335000\t1969-10-06\t120\tA\n\
USGS\t03335000\t1969-10-07\t90.0\tA\n\
USGS\t03335000\t1969-10-08\t70.0\tA:e\n"
}

/// Tippecanoe River (03331500) saved by hand with space-separated columns
/// and the short column names used by older downloads.
#[cfg(test)]
pub(crate) fn fixture_hand_saved_rdb() -> &'static str {
    "# USGS 03331500 TIPPECANOE RIVER NEAR OCKLEY, IN\n\
agency_cd site_no Date Discharge Quality\n\
5s 15s 20d 14n 10s\n\
USGS 03331500 1969-10-01 1120 A\n\
USGS 03331500 1969-10-02 1090 A\n\
USGS 03331500 1969-10-03 Ice A\n\
USGS 03331500 1969-10-04 1010 A:e\n"
}
