//! Blood request records as exchanged with the API.

use serde::{Deserialize, Deserializer, Serialize};

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodGroup {
    /// All groups, in the order the form offers them.
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
        }
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("Invalid blood group: {}", s))
    }
}

/// Store-assigned identity of a blood request (the `_id` field).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        RequestId(id.to_string())
    }
}

impl std::ops::Deref for RequestId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A request for blood, as composed by the form and sent to the creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub patient_name: String,
    pub blood_group: BloodGroup,
    /// Number of bags requested; always at least 1
    #[serde(deserialize_with = "amount_from_number_or_string")]
    pub amount: u32,
    pub hospital_name: String,
    /// Date the blood is needed, as entered (YYYY-MM-DD from a date input)
    pub date: String,
    pub user_division: String,
    pub user_district: String,
    pub user_city: String,
    pub phone_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Identity of the requester, attached from the session when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl BloodRequest {
    /// Table "District" column: `"<district>, <division>"`.
    pub fn district_label(&self) -> String {
        format!("{}, {}", self.user_district, self.user_division)
    }

    /// Card "Location" line: `"<city>, <district>"`.
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.user_city, self.user_district)
    }
}

/// A blood request as returned by the listing endpoint, with its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBloodRequest {
    #[serde(rename = "_id")]
    pub id: RequestId,
    #[serde(flatten)]
    pub request: BloodRequest,
}

impl std::ops::Deref for StoredBloodRequest {
    type Target = BloodRequest;
    fn deref(&self) -> &Self::Target {
        &self.request
    }
}

// Older records stored the amount as the raw input string.
fn amount_from_number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(u32),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(n) => Ok(n),
        Amount::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BloodRequest {
        BloodRequest {
            patient_name: "Rahim Uddin".to_string(),
            blood_group: BloodGroup::ONegative,
            amount: 2,
            hospital_name: "Dhaka Medical College".to_string(),
            date: "2026-11-02".to_string(),
            user_division: "Dhaka".to_string(),
            user_district: "Gazipur".to_string(),
            user_city: "Tongi".to_string(),
            phone_no: "01712345678".to_string(),
            notes: None,
            user: Some("donor@example.com".to_string()),
        }
    }

    #[test]
    fn test_blood_group_strings() {
        let strings: Vec<_> = BloodGroup::ALL.iter().map(|g| g.as_str()).collect();
        assert_eq!(strings, vec!["A+", "A-", "B+", "B-", "O+", "O-", "AB+", "AB-"]);
        for group in BloodGroup::ALL {
            assert_eq!(group.as_str().parse::<BloodGroup>().unwrap(), group);
        }
        assert!("C+".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn test_serializes_camel_case_wire_format() {
        let value = serde_json::to_value(request()).unwrap();
        assert_eq!(value["patientName"], "Rahim Uddin");
        assert_eq!(value["bloodGroup"], "O-");
        assert_eq!(value["amount"], 2);
        assert_eq!(value["userCity"], "Tongi");
        assert_eq!(value["phoneNo"], "01712345678");
        assert_eq!(value["user"], "donor@example.com");
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn test_stored_request_accepts_string_amount() {
        let json = r#"{
            "_id": "665f1c2ab3",
            "patientName": "Karim",
            "bloodGroup": "AB+",
            "amount": "3",
            "hospitalName": "Square Hospital",
            "date": "2026-10-30",
            "userDivision": "Dhaka",
            "userDistrict": "Gazipur",
            "userCity": "Sreepur",
            "phoneNo": "01812345678",
            "notes": "Evening preferred"
        }"#;
        let stored: StoredBloodRequest = serde_json::from_str(json).unwrap();
        assert_eq!(stored.id, RequestId::from("665f1c2ab3"));
        assert_eq!(stored.amount, 3);
        assert_eq!(stored.blood_group, BloodGroup::AbPositive);
        assert_eq!(stored.notes.as_deref(), Some("Evening preferred"));
        assert_eq!(stored.user, None);
    }

    #[test]
    fn test_row_labels() {
        let r = request();
        assert_eq!(r.district_label(), "Gazipur, Dhaka");
        assert_eq!(r.location_label(), "Tongi, Gazipur");
    }
}
