// Display payloads for each step, evaluated against the session context

use serde_json::{json, Value};

use super::context::{WorkflowContext, ECHOED_CONTEXT_KEY};
use super::step::StepId;

/// Context key holding the lead reference assigned on completion
pub const LEAD_ID_KEY: &str = "lead_id";

const REPLACEMENT_VEHICLE: &str = "replacement_vehicle";

fn vehicle_options() -> Value {
    json!({
        "knows_vehicle": "Yes, I know what I want",
        "needs_help": "No, I need help choosing"
    })
}

fn lead_id(context: &WorkflowContext) -> Value {
    context.get(LEAD_ID_KEY).cloned().unwrap_or(Value::Null)
}

/// The context a client may send back, minus an earlier echo and the lead id.
/// Without this each replacement loop would nest the whole context again.
fn echoed_context(context: &WorkflowContext) -> Value {
    let mut echo = context.as_map().clone();
    echo.remove(ECHOED_CONTEXT_KEY);
    echo.remove(LEAD_ID_KEY);
    Value::Object(echo)
}

fn selected_vehicle(context: &WorkflowContext) -> Value {
    context.lookup("selectedVehicle").cloned().unwrap_or(Value::Null)
}

/// Build the `data` payload shown for `step`.
pub fn payload(step: StepId, context: &WorkflowContext) -> Value {
    match step {
        StepId::IntentSelection => json!({
            "message": "Do you want to buy, or sell a vehicle?",
            "options": {
                "buying": "I want to buy a vehicle",
                "selling": "I want to sell a vehicle"
            }
        }),
        StepId::VehicleKnowledge => {
            if context.lookup_str("vehicle_context") == Some(REPLACEMENT_VEHICLE) {
                json!({
                    "message": "Let's help you find your replacement vehicle",
                    "context": REPLACEMENT_VEHICLE,
                    "options": vehicle_options()
                })
            } else {
                json!({
                    "message": "Do you already know which vehicle you want to buy?",
                    "options": vehicle_options()
                })
            }
        }
        StepId::VehicleSearch => json!({
            "message": "Tell us about the vehicle you're looking for",
            "fields": {
                "make": "Vehicle Make",
                "model": "Vehicle Model",
                "year": "Year",
                "budget": "Budget Range"
            }
        }),
        StepId::CarinAnalytics => json!({
            "message": "Let's help you find the perfect vehicle",
            "questions": {
                "usage": "How will you primarily use this vehicle?",
                "passengers": "How many passengers do you typically carry?",
                "budget": "What's your budget range?",
                "features": "What features are most important to you?"
            }
        }),
        StepId::SearchResults => json!({
            "message": "Here are vehicles matching your criteria"
        }),
        StepId::CarinResults => json!({
            "message": "Based on your preferences, here are our recommendations"
        }),
        StepId::VehicleValuationReport => json!({
            "message": "Vehicle Valuation Report",
            "vehicleInterest": context.lookup("vehicleInterest").cloned().unwrap_or(Value::Null)
        }),
        StepId::VehiclePurchaseConfirmation => {
            let message = match context.lookup_str("vehicleInterest") {
                Some(vehicle) => format!("Complete your purchase request for the {vehicle}"),
                None => "Complete your purchase request".to_string(),
            };
            json!({
                "message": message,
                "valuationData": context.lookup("valuationData").cloned().unwrap_or(Value::Null)
            })
        }
        StepId::VehicleSelection => json!({
            "message": "Choose the vehicle you are interested in",
            "selectedVehicle": selected_vehicle(context)
        }),
        StepId::BuyingConfirmation => json!({
            "message": "Confirm your vehicle selection and provide contact details",
            "selectedVehicle": selected_vehicle(context),
            "fields": {
                "name": "Full Name",
                "email": "Email Address",
                "phone": "Phone Number"
            }
        }),
        StepId::BuyingComplete => json!({
            "message": "Thank you! Your request has been submitted successfully.",
            "nextSteps": "A dealer will contact you within 24 hours.",
            "leadId": lead_id(context)
        }),
        StepId::HasBuyer => json!({
            "message": "Do you already have a buyer for your vehicle?",
            "options": {
                "has_buyer": "Yes, I have a buyer",
                "no_buyer": "No, I need help finding a buyer"
            }
        }),
        StepId::BuyerType => json!({
            "message": "What type of buyer do you have?",
            "options": {
                "private": "Private individual",
                "dealer": "Dealer/Trade-in"
            }
        }),
        StepId::PrivateBuyer => json!({
            "message": "Tell us about your private buyer",
            "fields": {
                "financing": "Does buyer need financing?"
            }
        }),
        StepId::DealerNetwork => json!({
            "message": "We'll help you find buyers through our dealer network",
            "fields": {
                "vehicleInfo": "Vehicle Information",
                "condition": "Vehicle Condition",
                "mileage": "Current Mileage"
            }
        }),
        StepId::SellingConfirmation => json!({
            "message": "Review the details of your sale"
        }),
        StepId::ReplacementCheck => json!({
            "message": "Do you need a replacement vehicle?",
            "options": {
                "wants_replacement": "Yes, help me find a replacement",
                "no_replacement": "No, I don't need a replacement"
            },
            "context": echoed_context(context)
        }),
        StepId::FinancingAssistanceComplete => json!({
            "message": "Thank you for your request!",
            "description": "One of our Financial & Insurance (F&I) representatives will be in \
                touch regarding financing assistance for your buyer.",
            "nextSteps": "Our F&I team will contact you within 24 hours to discuss financing \
                options and next steps.",
            "assistanceType": "financing",
            "leadId": lead_id(context)
        }),
        StepId::DealerNetworkComplete => json!({
            "message": "Thank you for your submission!",
            "description": "We'll connect you with dealers in our network who are interested in \
                your vehicle type.",
            "nextSteps": "Our dealer network team will review your vehicle information and match \
                you with interested buyers within 48 hours.",
            "assistanceType": "dealer_network",
            "leadId": lead_id(context)
        }),
        StepId::NoAssistanceNeeded => json!({
            "message": "You're all set!",
            "description": "It looks like you have everything under control with your vehicle \
                sale. We're here if you need us in the future!",
            "nextSteps": "Feel free to return anytime if your situation changes or if you need \
                assistance with future vehicle transactions.",
            "leadId": lead_id(context)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn ctx(value: Value) -> WorkflowContext {
        WorkflowContext::from(value.as_object().cloned().unwrap_or_else(Map::new))
    }

    #[test]
    fn vehicle_knowledge_switches_to_replacement_framing() {
        let plain = payload(StepId::VehicleKnowledge, &WorkflowContext::new());
        assert_eq!(plain["message"], "Do you already know which vehicle you want to buy?");
        assert!(plain.get("context").is_none());

        let replacement = payload(
            StepId::VehicleKnowledge,
            &ctx(json!({"vehicle_context": "replacement_vehicle"})),
        );
        assert_eq!(replacement["message"], "Let's help you find your replacement vehicle");
        assert_eq!(replacement["context"], "replacement_vehicle");
    }

    #[test]
    fn confirmation_echoes_selected_vehicle() {
        let data = payload(
            StepId::BuyingConfirmation,
            &ctx(json!({"selectedVehicle": {"make": "Toyota", "model": "Camry"}})),
        );
        assert_eq!(data["selectedVehicle"]["model"], "Camry");
    }

    #[test]
    fn replacement_check_echoes_accumulated_context() {
        let data = payload(
            StepId::ReplacementCheck,
            &ctx(json!({"assistance_type": "dealer_network"})),
        );
        assert_eq!(data["context"]["assistance_type"], "dealer_network");
    }

    #[test]
    fn replacement_check_echo_never_nests_an_earlier_echo() {
        let data = payload(
            StepId::ReplacementCheck,
            &ctx(json!({
                "intent": "dealer-network",
                "context": {"intent": "selling", "context": {"intent": "selling"}},
                "lead_id": "LEAD-1"
            })),
        );
        assert_eq!(data["context"], json!({"intent": "dealer-network"}));
    }

    #[test]
    fn terminals_expose_lead_id() {
        let context = ctx(json!({"lead_id": "LEAD-1700000000000"}));
        for step in [
            StepId::BuyingComplete,
            StepId::FinancingAssistanceComplete,
            StepId::DealerNetworkComplete,
            StepId::NoAssistanceNeeded,
        ] {
            assert_eq!(payload(step, &context)["leadId"], "LEAD-1700000000000");
        }
        assert_eq!(
            payload(StepId::FinancingAssistanceComplete, &context)["assistanceType"],
            "financing"
        );
    }
}
