use phf::phf_map;

static EN: phf::Map<&'static str, &'static str> = phf_map! {
    "medicine_added" => "Medicine added successfully!",
    "medicine_add_failed" => "Failed to add medicine",
    "medicine_add_error" => "Error adding medicine",
    "medicine_updated" => "Medicine updated successfully!",
    "medicine_update_failed" => "Failed to update medicine",
    "medicine_update_error" => "Error updating medicine",
    "medicine_deleted" => "Medicine deleted successfully!",
    "medicine_delete_failed" => "Failed to delete medicine",
    "medicine_delete_error" => "Error deleting medicine",
    "medicine_delete_confirm" => "Are you sure you want to delete this medicine? This action cannot be undone.",
    "medicines_load_failed" => "Failed to load medicines",
    "medicines_load_error" => "Error loading medicines",
    "medicine_details_failed" => "Failed to load medicine details",
    "medicine_details_error" => "Error loading medicine details",
    "medicine_fields_required" => "Please fill in all required fields",
    "medicine_quantity_invalid" => "Quantity must be a whole number",
    "medicine_price_invalid" => "Unit price must be a number",
    "medicine_edit_not_open" => "No medicine is open for editing",
    "stats_load_failed" => "Failed to load dashboard stats",
    "stats_load_error" => "Error loading dashboard stats",
    "staff_load_failed" => "Failed to load staff info",
    "staff_load_error" => "Error loading staff info",
    "staff_not_loaded" => "Staff information not loaded. Please refresh the page.",
    "available_load_failed" => "Failed to load available medicines",
    "available_load_error" => "Error loading available medicines",
    "sales_load_failed" => "Failed to load sales",
    "sales_load_error" => "Error loading sales",
    "sales_empty" => "No sales records found",
    "records_load_error" => "Error loading records",
    "sale_recorded" => "Sale recorded successfully!",
    "sale_failed" => "Failed to record sale",
    "sale_error" => "Error recording sale",
    "sale_select_medicine" => "Please select a medicine",
    "sale_quantity_positive" => "Quantity must be greater than 0",
    "sale_phone_invalid" => "Please enter a valid phone number",
    "payment_no_order" => "No payment order is pending",
    "prescription_upload_failed" => "Failed to upload prescription",
    "prescription_upload_error" => "Error uploading prescription",
    "receipt_sent" => "Receipt sent successfully!",
    "receipt_failed" => "Failed to send receipt",
    "receipt_error" => "Error sending receipt",
    "payment_order_created" => "Payment order created",
    "payment_order_failed" => "Failed to create payment order",
    "payment_order_error" => "Error creating payment order",
    "payment_verified" => "Payment verified and sale recorded successfully",
    "payment_verify_failed" => "Payment verification failed",
    "payment_verify_error" => "Error verifying payment",
    "logout_failed" => "Failed to log out",
    "logout_error" => "Error logging out",
    "chat_welcome" => "Hello! I'm your MEDicos medical assistant. I can help you with information about medicines, their uses, side effects, and dosages. ⚠️ Important: This information is for educational purposes only. Always consult healthcare professionals for medical advice.",
    "chat_server_error" => "Sorry, I encountered an error. Please try again.",
    "chat_transport_error" => "Sorry, I'm having trouble connecting. Please check your internet connection and try again.",
    "chat_disclaimer" => "⚠️ Disclaimer: Always consult healthcare professionals for medical advice.",
};

static ES: phf::Map<&'static str, &'static str> = phf_map! {
    "medicine_added" => "¡Medicamento agregado correctamente!",
    "medicine_add_failed" => "No se pudo agregar el medicamento",
    "medicine_add_error" => "Error al agregar el medicamento",
    "medicine_updated" => "¡Medicamento actualizado correctamente!",
    "medicine_update_failed" => "No se pudo actualizar el medicamento",
    "medicine_update_error" => "Error al actualizar el medicamento",
    "medicine_deleted" => "¡Medicamento eliminado correctamente!",
    "medicine_delete_failed" => "No se pudo eliminar el medicamento",
    "medicine_delete_error" => "Error al eliminar el medicamento",
    "medicine_delete_confirm" => "¿Seguro que desea eliminar este medicamento? Esta acción no se puede deshacer.",
    "medicines_load_failed" => "No se pudieron cargar los medicamentos",
    "medicines_load_error" => "Error al cargar los medicamentos",
    "medicine_details_failed" => "No se pudieron cargar los detalles del medicamento",
    "medicine_details_error" => "Error al cargar los detalles del medicamento",
    "medicine_fields_required" => "Complete todos los campos obligatorios",
    "medicine_quantity_invalid" => "La cantidad debe ser un número entero",
    "medicine_price_invalid" => "El precio unitario debe ser un número",
    "medicine_edit_not_open" => "No hay ningún medicamento abierto para editar",
    "staff_not_loaded" => "No se cargó la información del personal. Actualice la página.",
    "sales_load_failed" => "No se pudieron cargar las ventas",
    "sales_load_error" => "Error al cargar las ventas",
    "sales_empty" => "No se encontraron registros de ventas",
    "records_load_error" => "Error al cargar los registros",
    "sale_recorded" => "¡Venta registrada correctamente!",
    "sale_failed" => "No se pudo registrar la venta",
    "sale_error" => "Error al registrar la venta",
    "sale_select_medicine" => "Seleccione un medicamento",
    "sale_quantity_positive" => "La cantidad debe ser mayor que 0",
    "sale_phone_invalid" => "Ingrese un número de teléfono válido",
    "prescription_upload_failed" => "No se pudo subir la receta",
    "prescription_upload_error" => "Error al subir la receta",
    "receipt_sent" => "¡Recibo enviado correctamente!",
    "receipt_failed" => "No se pudo enviar el recibo",
    "receipt_error" => "Error al enviar el recibo",
    "logout_error" => "Error al cerrar sesión",
    "chat_welcome" => "¡Hola! Soy su asistente médico de MEDicos. Puedo ayudarle con información sobre medicamentos, sus usos, efectos secundarios y dosis. ⚠️ Importante: esta información es solo educativa. Consulte siempre a profesionales de la salud.",
    "chat_server_error" => "Lo siento, ocurrió un error. Inténtelo de nuevo.",
    "chat_transport_error" => "Lo siento, tengo problemas de conexión. Revise su conexión a internet e inténtelo de nuevo.",
    "chat_disclaimer" => "⚠️ Aviso: consulte siempre a profesionales de la salud.",
};

/// Notification texts keyed by language, with English as the fallback.
#[derive(Clone, Debug)]
pub struct I18n {
    lang: String,
}

impl I18n {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }

    pub fn get(&self, key: &str) -> String {
        catalog(&self.lang)
            .and_then(|map| map.get(key))
            .or_else(|| EN.get(key))
            .map(|text| text.to_string())
            .unwrap_or_else(|| format!("Missing translation: {}", key))
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}

fn catalog(lang: &str) -> Option<&'static phf::Map<&'static str, &'static str>> {
    match lang {
        "en" => Some(&EN),
        "es" => Some(&ES),
        _ => None,
    }
}

pub fn is_supported(lang: &str) -> bool {
    catalog(lang).is_some()
}
