use super::OrderConfirmationEmail;

/// Minimal HTML escaping for customer-supplied text
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(super) fn render_confirmation(email: &OrderConfirmationEmail) -> String {
    let delivery = email.delivery_date.format("%A, %B %d, %Y");
    let name = escape(&email.customer_name);
    let order_id = escape(&email.order_id);
    let title = escape(&email.book_title);
    let payment_id = escape(&email.payment_id);
    let address = escape(&email.address);
    let pincode = escape(&email.pincode);
    let amount = email.amount.normalize();
    let delivery_charges = email.delivery_charges.normalize();
    let total = email.total_amount.normalize();

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #2563eb;">Payment Successful!</h2>
    <p>Dear {name},</p>
    <p>Thank you for your purchase! Your order has been confirmed.</p>
    <div style="background-color: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0;">
        <h3 style="margin-top: 0;">Order Details:</h3>
        <p><strong>Order ID:</strong> {order_id}</p>
        <p><strong>Book:</strong> {title}</p>
        <p><strong>Amount:</strong> &#8377;{amount}</p>
        <p><strong>Delivery Charges:</strong> &#8377;{delivery_charges}</p>
        <p><strong>Total Amount:</strong> &#8377;{total}</p>
        <p><strong>Payment ID:</strong> {payment_id}</p>
    </div>
    <div style="background-color: #dbeafe; padding: 20px; border-radius: 8px; margin: 20px 0;">
        <h3 style="margin-top: 0; color: #1e40af;">Delivery Information:</h3>
        <p><strong>Expected Delivery:</strong> {delivery}</p>
        <p><strong>Delivery Address:</strong><br>
        {address}<br>
        PIN: {pincode}</p>
    </div>
    <p>If you have any questions, please contact us.</p>
    <p>Best regards,<br>Book Store Team</p>
</div>"#
    )
}
