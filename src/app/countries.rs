//! Static ISO 3166-1 country reference table
//!
//! The table is compiled in and never mutated. Lookups accept the alpha-3
//! code used as the catalog key, the alpha-2 code, or the numeric code,
//! case-insensitively.

use serde::Serialize;

/// One row of the ISO 3166-1 table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountryInfo {
    /// Three-digit numeric code, zero padded (e.g. "404")
    pub numeric: &'static str,
    pub alpha2: &'static str,
    /// Catalog key (e.g. "KEN")
    pub alpha3: &'static str,
    pub name: &'static str,
}

const fn c(
    numeric: &'static str,
    alpha2: &'static str,
    alpha3: &'static str,
    name: &'static str,
) -> CountryInfo {
    CountryInfo {
        numeric,
        alpha2,
        alpha3,
        name,
    }
}

/// ISO 3166-1 countries, ordered by English short name
pub static COUNTRIES: &[CountryInfo] = &[
    c("004", "AF", "AFG", "Afghanistan"),
    c("248", "AX", "ALA", "Åland Islands"),
    c("008", "AL", "ALB", "Albania"),
    c("012", "DZ", "DZA", "Algeria"),
    c("016", "AS", "ASM", "American Samoa"),
    c("020", "AD", "AND", "Andorra"),
    c("024", "AO", "AGO", "Angola"),
    c("660", "AI", "AIA", "Anguilla"),
    c("010", "AQ", "ATA", "Antarctica"),
    c("028", "AG", "ATG", "Antigua and Barbuda"),
    c("032", "AR", "ARG", "Argentina"),
    c("051", "AM", "ARM", "Armenia"),
    c("533", "AW", "ABW", "Aruba"),
    c("036", "AU", "AUS", "Australia"),
    c("040", "AT", "AUT", "Austria"),
    c("031", "AZ", "AZE", "Azerbaijan"),
    c("044", "BS", "BHS", "Bahamas"),
    c("048", "BH", "BHR", "Bahrain"),
    c("050", "BD", "BGD", "Bangladesh"),
    c("052", "BB", "BRB", "Barbados"),
    c("112", "BY", "BLR", "Belarus"),
    c("056", "BE", "BEL", "Belgium"),
    c("084", "BZ", "BLZ", "Belize"),
    c("204", "BJ", "BEN", "Benin"),
    c("060", "BM", "BMU", "Bermuda"),
    c("064", "BT", "BTN", "Bhutan"),
    c("068", "BO", "BOL", "Bolivia, Plurinational State of"),
    c("535", "BQ", "BES", "Bonaire, Sint Eustatius and Saba"),
    c("070", "BA", "BIH", "Bosnia and Herzegovina"),
    c("072", "BW", "BWA", "Botswana"),
    c("074", "BV", "BVT", "Bouvet Island"),
    c("076", "BR", "BRA", "Brazil"),
    c("086", "IO", "IOT", "British Indian Ocean Territory"),
    c("096", "BN", "BRN", "Brunei Darussalam"),
    c("100", "BG", "BGR", "Bulgaria"),
    c("854", "BF", "BFA", "Burkina Faso"),
    c("108", "BI", "BDI", "Burundi"),
    c("132", "CV", "CPV", "Cabo Verde"),
    c("116", "KH", "KHM", "Cambodia"),
    c("120", "CM", "CMR", "Cameroon"),
    c("124", "CA", "CAN", "Canada"),
    c("136", "KY", "CYM", "Cayman Islands"),
    c("140", "CF", "CAF", "Central African Republic"),
    c("148", "TD", "TCD", "Chad"),
    c("152", "CL", "CHL", "Chile"),
    c("156", "CN", "CHN", "China"),
    c("162", "CX", "CXR", "Christmas Island"),
    c("166", "CC", "CCK", "Cocos (Keeling) Islands"),
    c("170", "CO", "COL", "Colombia"),
    c("174", "KM", "COM", "Comoros"),
    c("178", "CG", "COG", "Congo"),
    c("180", "CD", "COD", "Congo, Democratic Republic of the"),
    c("184", "CK", "COK", "Cook Islands"),
    c("188", "CR", "CRI", "Costa Rica"),
    c("384", "CI", "CIV", "Côte d'Ivoire"),
    c("191", "HR", "HRV", "Croatia"),
    c("192", "CU", "CUB", "Cuba"),
    c("531", "CW", "CUW", "Curaçao"),
    c("196", "CY", "CYP", "Cyprus"),
    c("203", "CZ", "CZE", "Czechia"),
    c("208", "DK", "DNK", "Denmark"),
    c("262", "DJ", "DJI", "Djibouti"),
    c("212", "DM", "DMA", "Dominica"),
    c("214", "DO", "DOM", "Dominican Republic"),
    c("218", "EC", "ECU", "Ecuador"),
    c("818", "EG", "EGY", "Egypt"),
    c("222", "SV", "SLV", "El Salvador"),
    c("226", "GQ", "GNQ", "Equatorial Guinea"),
    c("232", "ER", "ERI", "Eritrea"),
    c("233", "EE", "EST", "Estonia"),
    c("748", "SZ", "SWZ", "Eswatini"),
    c("231", "ET", "ETH", "Ethiopia"),
    c("238", "FK", "FLK", "Falkland Islands (Malvinas)"),
    c("234", "FO", "FRO", "Faroe Islands"),
    c("242", "FJ", "FJI", "Fiji"),
    c("246", "FI", "FIN", "Finland"),
    c("250", "FR", "FRA", "France"),
    c("254", "GF", "GUF", "French Guiana"),
    c("258", "PF", "PYF", "French Polynesia"),
    c("260", "TF", "ATF", "French Southern Territories"),
    c("266", "GA", "GAB", "Gabon"),
    c("270", "GM", "GMB", "Gambia"),
    c("268", "GE", "GEO", "Georgia"),
    c("276", "DE", "DEU", "Germany"),
    c("288", "GH", "GHA", "Ghana"),
    c("292", "GI", "GIB", "Gibraltar"),
    c("300", "GR", "GRC", "Greece"),
    c("304", "GL", "GRL", "Greenland"),
    c("308", "GD", "GRD", "Grenada"),
    c("312", "GP", "GLP", "Guadeloupe"),
    c("316", "GU", "GUM", "Guam"),
    c("320", "GT", "GTM", "Guatemala"),
    c("831", "GG", "GGY", "Guernsey"),
    c("324", "GN", "GIN", "Guinea"),
    c("624", "GW", "GNB", "Guinea-Bissau"),
    c("328", "GY", "GUY", "Guyana"),
    c("332", "HT", "HTI", "Haiti"),
    c("334", "HM", "HMD", "Heard Island and McDonald Islands"),
    c("336", "VA", "VAT", "Holy See"),
    c("340", "HN", "HND", "Honduras"),
    c("344", "HK", "HKG", "Hong Kong"),
    c("348", "HU", "HUN", "Hungary"),
    c("352", "IS", "ISL", "Iceland"),
    c("356", "IN", "IND", "India"),
    c("360", "ID", "IDN", "Indonesia"),
    c("364", "IR", "IRN", "Iran, Islamic Republic of"),
    c("368", "IQ", "IRQ", "Iraq"),
    c("372", "IE", "IRL", "Ireland"),
    c("833", "IM", "IMN", "Isle of Man"),
    c("376", "IL", "ISR", "Israel"),
    c("380", "IT", "ITA", "Italy"),
    c("388", "JM", "JAM", "Jamaica"),
    c("392", "JP", "JPN", "Japan"),
    c("832", "JE", "JEY", "Jersey"),
    c("400", "JO", "JOR", "Jordan"),
    c("398", "KZ", "KAZ", "Kazakhstan"),
    c("404", "KE", "KEN", "Kenya"),
    c("296", "KI", "KIR", "Kiribati"),
    c("408", "KP", "PRK", "Korea, Democratic People's Republic of"),
    c("410", "KR", "KOR", "Korea, Republic of"),
    c("414", "KW", "KWT", "Kuwait"),
    c("417", "KG", "KGZ", "Kyrgyzstan"),
    c("418", "LA", "LAO", "Lao People's Democratic Republic"),
    c("428", "LV", "LVA", "Latvia"),
    c("422", "LB", "LBN", "Lebanon"),
    c("426", "LS", "LSO", "Lesotho"),
    c("430", "LR", "LBR", "Liberia"),
    c("434", "LY", "LBY", "Libya"),
    c("438", "LI", "LIE", "Liechtenstein"),
    c("440", "LT", "LTU", "Lithuania"),
    c("442", "LU", "LUX", "Luxembourg"),
    c("446", "MO", "MAC", "Macao"),
    c("450", "MG", "MDG", "Madagascar"),
    c("454", "MW", "MWI", "Malawi"),
    c("458", "MY", "MYS", "Malaysia"),
    c("462", "MV", "MDV", "Maldives"),
    c("466", "ML", "MLI", "Mali"),
    c("470", "MT", "MLT", "Malta"),
    c("584", "MH", "MHL", "Marshall Islands"),
    c("474", "MQ", "MTQ", "Martinique"),
    c("478", "MR", "MRT", "Mauritania"),
    c("480", "MU", "MUS", "Mauritius"),
    c("175", "YT", "MYT", "Mayotte"),
    c("484", "MX", "MEX", "Mexico"),
    c("583", "FM", "FSM", "Micronesia, Federated States of"),
    c("498", "MD", "MDA", "Moldova, Republic of"),
    c("492", "MC", "MCO", "Monaco"),
    c("496", "MN", "MNG", "Mongolia"),
    c("499", "ME", "MNE", "Montenegro"),
    c("500", "MS", "MSR", "Montserrat"),
    c("504", "MA", "MAR", "Morocco"),
    c("508", "MZ", "MOZ", "Mozambique"),
    c("104", "MM", "MMR", "Myanmar"),
    c("516", "NA", "NAM", "Namibia"),
    c("520", "NR", "NRU", "Nauru"),
    c("524", "NP", "NPL", "Nepal"),
    c("528", "NL", "NLD", "Netherlands"),
    c("540", "NC", "NCL", "New Caledonia"),
    c("554", "NZ", "NZL", "New Zealand"),
    c("558", "NI", "NIC", "Nicaragua"),
    c("562", "NE", "NER", "Niger"),
    c("566", "NG", "NGA", "Nigeria"),
    c("570", "NU", "NIU", "Niue"),
    c("574", "NF", "NFK", "Norfolk Island"),
    c("807", "MK", "MKD", "North Macedonia"),
    c("580", "MP", "MNP", "Northern Mariana Islands"),
    c("578", "NO", "NOR", "Norway"),
    c("512", "OM", "OMN", "Oman"),
    c("586", "PK", "PAK", "Pakistan"),
    c("585", "PW", "PLW", "Palau"),
    c("275", "PS", "PSE", "Palestine, State of"),
    c("591", "PA", "PAN", "Panama"),
    c("598", "PG", "PNG", "Papua New Guinea"),
    c("600", "PY", "PRY", "Paraguay"),
    c("604", "PE", "PER", "Peru"),
    c("608", "PH", "PHL", "Philippines"),
    c("612", "PN", "PCN", "Pitcairn"),
    c("616", "PL", "POL", "Poland"),
    c("620", "PT", "PRT", "Portugal"),
    c("630", "PR", "PRI", "Puerto Rico"),
    c("634", "QA", "QAT", "Qatar"),
    c("638", "RE", "REU", "Réunion"),
    c("642", "RO", "ROU", "Romania"),
    c("643", "RU", "RUS", "Russian Federation"),
    c("646", "RW", "RWA", "Rwanda"),
    c("652", "BL", "BLM", "Saint Barthélemy"),
    c("654", "SH", "SHN", "Saint Helena, Ascension and Tristan da Cunha"),
    c("659", "KN", "KNA", "Saint Kitts and Nevis"),
    c("662", "LC", "LCA", "Saint Lucia"),
    c("663", "MF", "MAF", "Saint Martin (French part)"),
    c("666", "PM", "SPM", "Saint Pierre and Miquelon"),
    c("670", "VC", "VCT", "Saint Vincent and the Grenadines"),
    c("882", "WS", "WSM", "Samoa"),
    c("674", "SM", "SMR", "San Marino"),
    c("678", "ST", "STP", "Sao Tome and Principe"),
    c("682", "SA", "SAU", "Saudi Arabia"),
    c("686", "SN", "SEN", "Senegal"),
    c("688", "RS", "SRB", "Serbia"),
    c("690", "SC", "SYC", "Seychelles"),
    c("694", "SL", "SLE", "Sierra Leone"),
    c("702", "SG", "SGP", "Singapore"),
    c("534", "SX", "SXM", "Sint Maarten (Dutch part)"),
    c("703", "SK", "SVK", "Slovakia"),
    c("705", "SI", "SVN", "Slovenia"),
    c("090", "SB", "SLB", "Solomon Islands"),
    c("706", "SO", "SOM", "Somalia"),
    c("710", "ZA", "ZAF", "South Africa"),
    c("239", "GS", "SGS", "South Georgia and the South Sandwich Islands"),
    c("728", "SS", "SSD", "South Sudan"),
    c("724", "ES", "ESP", "Spain"),
    c("144", "LK", "LKA", "Sri Lanka"),
    c("729", "SD", "SDN", "Sudan"),
    c("740", "SR", "SUR", "Suriname"),
    c("744", "SJ", "SJM", "Svalbard and Jan Mayen"),
    c("752", "SE", "SWE", "Sweden"),
    c("756", "CH", "CHE", "Switzerland"),
    c("760", "SY", "SYR", "Syrian Arab Republic"),
    c("158", "TW", "TWN", "Taiwan, Province of China"),
    c("762", "TJ", "TJK", "Tajikistan"),
    c("834", "TZ", "TZA", "Tanzania, United Republic of"),
    c("764", "TH", "THA", "Thailand"),
    c("626", "TL", "TLS", "Timor-Leste"),
    c("768", "TG", "TGO", "Togo"),
    c("772", "TK", "TKL", "Tokelau"),
    c("776", "TO", "TON", "Tonga"),
    c("780", "TT", "TTO", "Trinidad and Tobago"),
    c("788", "TN", "TUN", "Tunisia"),
    c("792", "TR", "TUR", "Türkiye"),
    c("795", "TM", "TKM", "Turkmenistan"),
    c("796", "TC", "TCA", "Turks and Caicos Islands"),
    c("798", "TV", "TUV", "Tuvalu"),
    c("800", "UG", "UGA", "Uganda"),
    c("804", "UA", "UKR", "Ukraine"),
    c("784", "AE", "ARE", "United Arab Emirates"),
    c("826", "GB", "GBR", "United Kingdom of Great Britain and Northern Ireland"),
    c("840", "US", "USA", "United States of America"),
    c("581", "UM", "UMI", "United States Minor Outlying Islands"),
    c("858", "UY", "URY", "Uruguay"),
    c("860", "UZ", "UZB", "Uzbekistan"),
    c("548", "VU", "VUT", "Vanuatu"),
    c("862", "VE", "VEN", "Venezuela, Bolivarian Republic of"),
    c("704", "VN", "VNM", "Viet Nam"),
    c("092", "VG", "VGB", "Virgin Islands, British"),
    c("850", "VI", "VIR", "Virgin Islands, U.S."),
    c("876", "WF", "WLF", "Wallis and Futuna"),
    c("732", "EH", "ESH", "Western Sahara"),
    c("887", "YE", "YEM", "Yemen"),
    c("894", "ZM", "ZMB", "Zambia"),
    c("716", "ZW", "ZWE", "Zimbabwe"),
];

/// All countries in table order
pub fn all() -> &'static [CountryInfo] {
    COUNTRIES
}

/// Find a country by alpha-3, alpha-2 or numeric code
///
/// Numeric codes may omit leading zeros ("4" finds Afghanistan).
pub fn lookup(code: &str) -> Option<&'static CountryInfo> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }

    if code.chars().all(|ch| ch.is_ascii_digit()) {
        let wanted = code.parse::<u16>().ok()?;
        return COUNTRIES
            .iter()
            .find(|country| country.numeric.parse::<u16>().ok() == Some(wanted));
    }

    match code.len() {
        3 => COUNTRIES
            .iter()
            .find(|country| country.alpha3.eq_ignore_ascii_case(code)),
        2 => COUNTRIES
            .iter()
            .find(|country| country.alpha2.eq_ignore_ascii_case(code)),
        _ => None,
    }
}
